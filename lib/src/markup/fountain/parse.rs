use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// One element of a screenplay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    TitlePage(Vec<(String, String)>),
    SceneHeading { text: String, number: Option<String> },
    Action(String),
    Dialogue(Dialogue),
    Transition(String),
    Centered(String),
    PageBreak,
    Section { depth: usize, text: String },
    Synopsis(String),
    Lyrics(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialogue {
    pub character: String,
    /// A parenthesized extension such as `V.O.`, without the parentheses.
    pub extension: Option<String>,
    /// Whether this dialogue is spoken simultaneously with the previous one.
    pub dual: bool,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Parenthetical(String),
    Speech(String),
    Lyric(String),
}

static SCENE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:INT\.?/EXT|INT/EXT|I/E|INT|EXT|EST)[. ]").expect("valid scene regex")
});

static SCENE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*#([^#\s]+)#$").expect("valid scene number regex")
});

static TITLE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z ]*):[ \t]*(.*)$").expect("valid title key regex")
});

/// Parses a Fountain screenplay.
///
/// Fails with a render error if a boneyard `/*` or a note `[[` is never
/// closed.
pub fn parse(input: &str) -> Result<Vec<Element>> {
    let input = strip_boneyard(input)?;
    check_notes(&input)?;

    let mut elements = vec![];
    let mut blocks = blocks(&input).peekable();
    if let Some(first) = blocks.peek() {
        if let Some(title_page) = title_page(first) {
            elements.push(Element::TitlePage(title_page));
            blocks.next();
        }
    }

    for block in blocks {
        parse_block(&block, &mut elements);
    }

    Ok(elements)
}

fn line_of(input: &str, offset: usize) -> usize {
    input[..offset].matches('\n').count() + 1
}

fn strip_boneyard(input: &str) -> Result<Cow<'_, str>> {
    let Some(mut start) = input.find("/*") else {
        return Ok(Cow::Borrowed(input));
    };

    let mut output = String::with_capacity(input.len());
    let mut last = 0;
    loop {
        let Some(len) = input[start + 2..].find("*/") else {
            return err! {
                Render: "unterminated boneyard",
                "line" => line_of(input, start),
            };
        };

        output.push_str(&input[last..start]);
        last = start + 2 + len + 2;
        match input[last..].find("/*") {
            Some(next) => start = last + next,
            None => break,
        }
    }

    output.push_str(&input[last..]);
    Ok(Cow::Owned(output))
}

fn check_notes(input: &str) -> Result<()> {
    let mut rest = 0;
    while let Some(start) = input[rest..].find("[[").map(|i| rest + i) {
        match input[start + 2..].find("]]") {
            Some(len) => rest = start + 2 + len + 2,
            None => return err! {
                Render: "unterminated note",
                "line" => line_of(input, start),
            },
        }
    }

    Ok(())
}

/// Runs of non-blank lines.
fn blocks(input: &str) -> impl Iterator<Item = Vec<&str>> + '_ {
    let mut lines = input.lines().peekable();
    std::iter::from_fn(move || {
        while lines.next_if(|line| line.trim().is_empty()).is_some() {}

        let mut block = vec![];
        while let Some(line) = lines.next_if(|line| !line.trim().is_empty()) {
            block.push(line);
        }

        (!block.is_empty()).then_some(block)
    })
}

const TITLE_PAGE_KEYS: &[&str] = &[
    "title", "credit", "author", "authors", "source", "draft date", "date",
    "contact", "copyright", "notes", "revision",
];

fn title_page(block: &[&str]) -> Option<Vec<(String, String)>> {
    let key = TITLE_KEY.captures(block.first()?)?;
    if !TITLE_PAGE_KEYS.iter().any(|k| key[1].trim().eq_ignore_ascii_case(k)) {
        return None;
    }

    let mut fields: Vec<(String, String)> = vec![];
    for line in block {
        if let Some(caps) = TITLE_KEY.captures(line) {
            fields.push((caps[1].trim().to_string(), caps[2].trim().to_string()));
        } else if let Some((_, value)) = fields.last_mut() {
            if !value.is_empty() {
                value.push('\n');
            }

            value.push_str(line.trim());
        }
    }

    Some(fields)
}

fn parse_block(block: &[&str], elements: &mut Vec<Element>) {
    let mut rest = block;
    while let Some((&first, tail)) = rest.split_first() {
        let line = first.trim();
        rest = tail;

        let element = if !line.is_empty() && line.len() >= 3 && line.bytes().all(|b| b == b'=') {
            Element::PageBreak
        } else if let Some(text) = line.strip_prefix('#') {
            let depth = 1 + text.bytes().take_while(|&b| b == b'#').count();
            Element::Section { depth, text: text.trim_start_matches('#').trim().to_string() }
        } else if let Some(text) = line.strip_prefix('=') {
            Element::Synopsis(text.trim().to_string())
        } else if let Some(text) = line.strip_prefix('!') {
            let element = Element::Action(action(text, rest));
            rest = &[];
            element
        } else if let Some(text) = line.strip_prefix('.').filter(|t| !t.starts_with('.')) {
            scene_heading(text)
        } else if SCENE_HEADING.is_match(line) {
            scene_heading(line)
        } else if line.starts_with('>') && line.ends_with('<') && line.len() > 1 {
            Element::Centered(line[1..line.len() - 1].trim().to_string())
        } else if let Some(text) = line.strip_prefix('>') {
            Element::Transition(text.trim().to_string())
        } else if is_upper(line) && line.ends_with("TO:") {
            Element::Transition(line.to_string())
        } else if line.starts_with('~') {
            let mut lyrics = vec![line[1..].trim()];
            while let Some((&next, tail)) = rest.split_first() {
                let Some(lyric) = next.trim().strip_prefix('~') else { break };
                lyrics.push(lyric.trim());
                rest = tail;
            }

            Element::Lyrics(lyrics.join("\n"))
        } else if let Some(dialogue) = character(line).filter(|_| !rest.is_empty()) {
            let element = Element::Dialogue(Dialogue { lines: dialogue_lines(rest), ..dialogue });
            rest = &[];
            element
        } else {
            let element = Element::Action(action(first, rest));
            rest = &[];
            element
        };

        elements.push(element);
    }
}

fn action(first: &str, rest: &[&str]) -> String {
    let mut text = first.trim_end().to_string();
    for line in rest {
        text.push('\n');
        text.push_str(line.trim_end());
    }

    text
}

fn scene_heading(text: &str) -> Element {
    let text = text.trim();
    match SCENE_NUMBER.captures(text) {
        Some(caps) => {
            let start = caps.get(0).map_or(text.len(), |m| m.start());
            Element::SceneHeading {
                text: text[..start].to_string(),
                number: Some(caps[1].to_string()),
            }
        }
        None => Element::SceneHeading { text: text.to_string(), number: None },
    }
}

/// `true` if `line` has at least one letter and no lowercase letters.
fn is_upper(line: &str) -> bool {
    line.chars().any(|c| c.is_alphabetic()) && !line.chars().any(|c| c.is_lowercase())
}

fn character(line: &str) -> Option<Dialogue> {
    let (line, dual) = match line.strip_suffix('^') {
        Some(line) => (line.trim_end(), true),
        None => (line, false),
    };

    let (name, forced) = match line.strip_prefix('@') {
        Some(name) => (name, true),
        None => (line, false),
    };

    let (name, extension) = match name.find('(') {
        Some(i) if name.ends_with(')') => {
            (name[..i].trim(), Some(name[i + 1..name.len() - 1].trim().to_string()))
        }
        _ => (name.trim(), None),
    };

    if name.is_empty() || !(forced || is_upper(name)) {
        return None;
    }

    Some(Dialogue { character: name.to_string(), extension, dual, lines: vec![] })
}

fn dialogue_lines(lines: &[&str]) -> Vec<Line> {
    let mut output: Vec<Line> = vec![];
    for line in lines.iter().map(|line| line.trim()) {
        if line.starts_with('(') && line.ends_with(')') {
            output.push(Line::Parenthetical(line.to_string()));
        } else if let Some(lyric) = line.strip_prefix('~') {
            output.push(Line::Lyric(lyric.trim().to_string()));
        } else if let Some(Line::Speech(speech)) = output.last_mut() {
            speech.push('\n');
            speech.push_str(line);
        } else {
            output.push(Line::Speech(line.to_string()));
        }
    }

    output
}

#[cfg(test)]
mod parse_tests {
    use super::*;
    use crate::error::ErrorKind;

    fn speech(text: &str) -> Line {
        Line::Speech(text.into())
    }

    #[test]
    fn title_page() {
        let elements = parse("Title: Big Fish\nCredit: written by\nAuthor: John August\nNotes:\n    First draft\n    Second line\n\nINT. HOUSE - DAY\n").unwrap();
        assert_eq!(elements[0], Element::TitlePage(vec![
            ("Title".into(), "Big Fish".into()),
            ("Credit".into(), "written by".into()),
            ("Author".into(), "John August".into()),
            ("Notes".into(), "First draft\nSecond line".into()),
        ]));

        assert_eq!(elements[1], Element::SceneHeading { text: "INT. HOUSE - DAY".into(), number: None });
    }

    #[test]
    fn scene_headings() {
        let elements = parse("EXT. BRICK'S PATIO - DAY #1A#\n\n.SNIPER SCOPE POV\n\nint/ext car - night\n").unwrap();
        assert_eq!(elements, vec![
            Element::SceneHeading { text: "EXT. BRICK'S PATIO - DAY".into(), number: Some("1A".into()) },
            Element::SceneHeading { text: "SNIPER SCOPE POV".into(), number: None },
            Element::SceneHeading { text: "int/ext car - night".into(), number: None },
        ]);
    }

    #[test]
    fn dialogue() {
        let elements = parse("STEEL (V.O.)\n(beat)\nThe man's a myth!\nReally.\n\n@McCLANE ^\nYippee ki-yay.\n").unwrap();
        assert_eq!(elements, vec![
            Element::Dialogue(Dialogue {
                character: "STEEL".into(),
                extension: Some("V.O.".into()),
                dual: false,
                lines: vec![Line::Parenthetical("(beat)".into()), speech("The man's a myth!\nReally.")],
            }),
            Element::Dialogue(Dialogue {
                character: "McCLANE".into(),
                extension: None,
                dual: true,
                lines: vec![speech("Yippee ki-yay.")],
            }),
        ]);
    }

    #[test]
    fn only_known_keys_open_a_title_page() {
        let elements = parse("Note: not a title page.\n").unwrap();
        assert_eq!(elements, vec![Element::Action("Note: not a title page.".into())]);
    }

    #[test]
    fn a_lone_capitalized_line_is_action() {
        let elements = parse("BOOM.\n\nThe house explodes.\n").unwrap();
        assert_eq!(elements, vec![
            Element::Action("BOOM.".into()),
            Element::Action("The house explodes.".into()),
        ]);
    }

    #[test]
    fn transitions_centered_and_breaks() {
        let elements = parse("CUT TO:\n\n> FADE OUT.\n\n> THE END <\n\n===\n\n!SCREAMING\n").unwrap();
        assert_eq!(elements, vec![
            Element::Transition("CUT TO:".into()),
            Element::Transition("FADE OUT.".into()),
            Element::Centered("THE END".into()),
            Element::PageBreak,
            Element::Action("SCREAMING".into()),
        ]);
    }

    #[test]
    fn sections_synopses_and_lyrics() {
        let elements = parse("# Act One\n\n## Sequence\n\n= Bob meets Alice.\n\n~Willy Wonka!\n~Willy Wonka!\n").unwrap();
        assert_eq!(elements, vec![
            Element::Section { depth: 1, text: "Act One".into() },
            Element::Section { depth: 2, text: "Sequence".into() },
            Element::Synopsis("Bob meets Alice.".into()),
            Element::Lyrics("Willy Wonka!\nWilly Wonka!".into()),
        ]);
    }

    #[test]
    fn boneyard_is_removed() {
        let elements = parse("Kept.\n\n/* Cut\n\nscene */\nAlso kept.\n").unwrap();
        assert_eq!(elements, vec![
            Element::Action("Kept.".into()),
            Element::Action("Also kept.".into()),
        ]);
    }

    #[test]
    fn unterminated_boneyard_and_notes_fail() {
        let error = parse("Line one.\n\n/* never closed\n").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Render);
        assert!(error.to_string().contains("line: 3"));

        let error = parse("He waits. [[ a note\n").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Render);
        assert!(error.to_string().contains("unterminated note"));
    }
}
