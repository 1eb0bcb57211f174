use std::ops::Range;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

/// Data arrays the extractor knows how to lift out of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognizedField {
    Products,
    HeroSections,
    Categories,
    CartItems,
    Faqs,
    Posts,
    Team,
    Testimonials,
    Results,
}

impl RecognizedField {
    pub const ALL: [Self; 9] = [
        Self::Products,
        Self::HeroSections,
        Self::Categories,
        Self::CartItems,
        Self::Faqs,
        Self::Posts,
        Self::Team,
        Self::Testimonials,
        Self::Results,
    ];

    /// Identifier as written in page source and as emitted in the merged config.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::HeroSections => "heroSections",
            Self::Categories => "categories",
            Self::CartItems => "cartItems",
            Self::Faqs => "faqs",
            Self::Posts => "posts",
            Self::Team => "team",
            Self::Testimonials => "testimonials",
            Self::Results => "results",
        }
    }
}

/// Compiled declaration patterns, one per recognized field.
#[derive(Debug, Clone)]
pub struct FieldMatchers {
    matchers: Vec<(RecognizedField, Regex)>,
}

impl FieldMatchers {
    pub fn compile() -> Result<Self> {
        let mut matchers = Vec::with_capacity(RecognizedField::ALL.len());
        for field in RecognizedField::ALL {
            // The annotation and initializer are checked by `initializer_start`.
            let pattern = format!(
                r"\b(?:const|let|var)\s+{}\b",
                regex::escape(field.as_str())
            );
            let regex = Regex::new(&pattern)
                .with_context(|| format!("failed to compile matcher for {}", field.as_str()))?;
            matchers.push((field, regex));
        }
        Ok(Self { matchers })
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecognizedField, &Regex)> {
        self.matchers.iter().map(|(field, regex)| (*field, regex))
    }
}

/// Byte offset of the opening `[` of the first live declaration of `regex`'s
/// field, ignoring matches that sit inside comments.
///
/// Handles `const products = [`, `export let team: Member[] = [` and
/// annotations such as `{ name: string; onClick: () => void }[]`.
pub fn locate_declaration(source: &str, regex: &Regex, comments: &[Range<usize>]) -> Option<usize> {
    regex
        .find_iter(source)
        .filter(|found| !comments.iter().any(|range| range.contains(&found.start())))
        .find_map(|found| initializer_start(source.as_bytes(), found.end()))
}

/// Offset of the `[` opening an array initializer that follows a declared name.
fn initializer_start(bytes: &[u8], after_name: usize) -> Option<usize> {
    let mut pos = skip_whitespace(bytes, after_name);
    if bytes.get(pos) == Some(&b':') {
        pos = annotation_end(bytes, pos + 1)?;
    }
    if bytes.get(pos) != Some(&b'=') {
        return None;
    }
    pos = skip_whitespace(bytes, pos + 1);
    (bytes.get(pos) == Some(&b'[')).then_some(pos)
}

/// Position of the `=` ending a type annotation. Brackets nest; `;` and `=`
/// only count outside them, and `=>` never ends it.
fn annotation_end(bytes: &[u8], mut pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'=' if bytes.get(pos + 1) == Some(&b'>') => pos += 1,
            b'=' if depth == 0 => return Some(pos),
            b';' if depth == 0 => return None,
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = depth.checked_sub(1)?,
            b'"' | b'\'' | b'`' => {
                let close = bytes[pos + 1..].iter().position(|candidate| *candidate == byte)?;
                pos += 1 + close;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

/// Approximate comment spans of a page source.
///
/// String state is tracked per line only, so stray quotes in JSX text (`Don't`)
/// cannot swallow the rest of the file.
pub fn comment_ranges(source: &str) -> Vec<Range<usize>> {
    let bytes = source.as_bytes();
    let mut ranges = Vec::new();
    let mut quote: Option<u8> = None;
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte == b'\n' {
            quote = None;
            pos += 1;
            continue;
        }
        if let Some(open) = quote {
            if byte == b'\\' {
                pos += 2;
                continue;
            }
            if byte == open {
                quote = None;
            }
            pos += 1;
            continue;
        }
        match byte {
            b'"' | b'\'' | b'`' => {
                quote = Some(byte);
                pos += 1;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                let end = source[pos..].find('\n').map_or(bytes.len(), |index| pos + index);
                ranges.push(pos..end);
                pos = end;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let end = source[pos + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |index| pos + 2 + index + 2);
                ranges.push(pos..end);
                pos = end;
            }
            _ => pos += 1,
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::{FieldMatchers, RecognizedField, comment_ranges, locate_declaration};

    fn locate(source: &str, field: RecognizedField) -> Option<usize> {
        let matchers = FieldMatchers::compile().expect("compile");
        let (_, regex) = matchers
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .expect("matcher");
        locate_declaration(source, regex, &comment_ranges(source))
    }

    #[test]
    fn field_names_match_page_identifiers() {
        let names: Vec<&str> = RecognizedField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, vec![
            "products",
            "heroSections",
            "categories",
            "cartItems",
            "faqs",
            "posts",
            "team",
            "testimonials",
            "results",
        ]);
        assert_eq!(
            serde_json::to_value(RecognizedField::CartItems).expect("serialize"),
            "cartItems"
        );
    }

    #[test]
    fn locates_plain_and_typed_declarations() {
        let source = "const products = [1];";
        assert_eq!(locate(source, RecognizedField::Products), Some(17));

        let typed = "export const team: TeamMember[] = [\n  { name: 'Ana' },\n];";
        let offset = locate(typed, RecognizedField::Team).expect("team");
        assert_eq!(&typed[offset..offset + 1], "[");
        assert!(typed[..offset].ends_with("= "));

        assert_eq!(locate("let  faqs\n=\n[]", RecognizedField::Faqs), Some(12));
    }

    #[test]
    fn locates_declarations_with_function_types() {
        let source = "const team: { name: string; onClick: () => void }[] = [];";
        let offset = locate(source, RecognizedField::Team).expect("team");
        assert_eq!(&source[offset..], "[];");

        let callback = "let posts: Array<(id: number) => Post> = [\n];";
        let offset = locate(callback, RecognizedField::Posts).expect("posts");
        assert_eq!(&callback[offset..offset + 1], "[");

        let literal_type = "const faqs: { kind: 'a=b' }[] = [];";
        let offset = locate(literal_type, RecognizedField::Faqs).expect("faqs");
        assert_eq!(&literal_type[offset..], "[];");
    }

    #[test]
    fn annotation_does_not_run_into_the_next_statement() {
        let source = "const team: Member[] = useTeam()\nconst other = [1];";
        assert_eq!(locate(source, RecognizedField::Team), None);
    }

    #[test]
    fn requires_exact_name_and_array_initializer() {
        assert_eq!(locate("const productsList = [1];", RecognizedField::Products), None);
        assert_eq!(locate("const myProducts = [1];", RecognizedField::Products), None);
        assert_eq!(locate("const products = useProducts();", RecognizedField::Products), None);
        assert_eq!(locate("products = [1];", RecognizedField::Products), None);
    }

    #[test]
    fn first_live_declaration_wins() {
        let source = "// const posts = [old];\n/* let posts = [older]; */\nconst posts = [1];\nconst posts = [2];";
        let offset = locate(source, RecognizedField::Posts).expect("posts");
        assert_eq!(&source[offset..offset + 3], "[1]");
    }

    #[test]
    fn comment_ranges_ignore_slashes_inside_strings() {
        let source =
            "const url = \"https://shop.example\"; // real\n<p>Don't panic</p>\nconst a = 1; /* c */";
        let ranges = comment_ranges(source);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&source[ranges[0].clone()], "// real");
        assert_eq!(&source[ranges[1].clone()], "/* c */");
    }
}
