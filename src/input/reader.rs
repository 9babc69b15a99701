//! `.ts` document reader.
//!
//! The reader walks the `quick-xml` event stream with one function per
//! element. Elements it does not know outside of text content
//! (`<userdata>`, `<dependencies>`, `<extra-*>`) are skipped; anything
//! structurally wrong is reported as [`CatalogError::Malformed`].

use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};
use quick_xml::name::QName;

use super::language::detect_language_from_path;
use crate::error::CatalogError;
use crate::ir::{
    Context,
    Message,
    TranslationFile,
    TranslationText,
};
use crate::types::{
    LineNumber,
    Location,
    TranslationStatus,
};

type XmlReader<'a> = Reader<&'a [u8]>;

fn malformed(reader: &XmlReader<'_>, message: impl Into<String>) -> CatalogError {
    let position = reader.buffer_position().try_into().unwrap_or(u64::MAX);
    CatalogError::Malformed { position, message: message.into() }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn next_event<'a>(reader: &mut XmlReader<'a>) -> Result<Event<'a>, CatalogError> {
    reader.read_event().map_err(|e| malformed(reader, format!("XML parse error: {e}")))
}

fn skip_element(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<(), CatalogError> {
    tracing::debug!("Skipping unsupported element <{}>", element_name(start));
    reader
        .read_to_end(start.name())
        .map(|_| ())
        .map_err(|e| malformed(reader, format!("XML parse error: {e}")))
}

fn attribute(
    reader: &XmlReader<'_>,
    start: &BytesStart<'_>,
    name: &str,
) -> Result<Option<String>, CatalogError> {
    let attr = start.try_get_attribute(name).map_err(|e| {
        malformed(reader, format!("invalid attribute on <{}>: {e}", element_name(start)))
    })?;

    attr.map(|attr| {
        attr.unescape_value().map(Cow::into_owned).map_err(|e| {
            malformed(reader, format!("invalid value of attribute '{name}': {e}"))
        })
    })
    .transpose()
}

/// Decode Qt's `<byte value="x1b"/>` escape for characters XML 1.0 cannot carry.
fn byte_escape(reader: &XmlReader<'_>, start: &BytesStart<'_>) -> Result<char, CatalogError> {
    let value = attribute(reader, start, "value")?
        .ok_or_else(|| malformed(reader, "<byte> without 'value' attribute"))?;

    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };

    code.ok()
        .and_then(char::from_u32)
        .ok_or_else(|| malformed(reader, format!("invalid <byte> value '{value}'")))
}

/// Collect the text content of the current element up to its end tag.
fn read_text(reader: &mut XmlReader<'_>, end: QName<'_>) -> Result<String, CatalogError> {
    let mut text = String::new();

    loop {
        match next_event(reader)? {
            Event::Text(e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| malformed(reader, format!("XML decode error: {e}")))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                let data = e.into_inner();
                text.push_str(&String::from_utf8_lossy(&data));
            }
            Event::Empty(e) if e.name().as_ref() == b"byte" => {
                text.push(byte_escape(reader, &e)?);
            }
            Event::Start(e) if e.name().as_ref() == b"byte" => {
                text.push(byte_escape(reader, &e)?);
                skip_element(reader, &e)?;
            }
            Event::End(e) if e.name() == end => return Ok(text),
            Event::Start(e) | Event::Empty(e) => {
                return Err(malformed(
                    reader,
                    format!("unexpected element <{}> inside text", element_name(&e)),
                ));
            }
            Event::Eof => return Err(malformed(reader, "unexpected end of document")),
            _ => {}
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Parse a `.ts` document.
///
/// # Examples
/// ```
/// use ts_catalog::input::parse_document;
///
/// let file = parse_document(
///     r#"<TS version="2.1" language="pl_PL">
///     <context>
///         <name>MainWindow</name>
///         <message>
///             <source>Open</source>
///             <translation>Otwórz</translation>
///         </message>
///     </context>
///     </TS>"#,
/// )
/// .unwrap();
///
/// assert_eq!(file.language.as_deref(), Some("pl_PL"));
/// assert_eq!(file.contexts[0].messages[0].source, "Open");
/// ```
pub fn parse_document(text: &str) -> Result<TranslationFile, CatalogError> {
    let mut reader = Reader::from_str(text);

    loop {
        match next_event(&mut reader)? {
            Event::Start(e) if e.name().as_ref() == b"TS" => {
                let file = parse_root(&mut reader, &e, true)?;
                expect_document_end(&mut reader)?;
                return Ok(file);
            }
            Event::Empty(e) if e.name().as_ref() == b"TS" => {
                let file = parse_root(&mut reader, &e, false)?;
                expect_document_end(&mut reader)?;
                return Ok(file);
            }
            Event::Start(e) | Event::Empty(e) => {
                return Err(malformed(
                    &reader,
                    format!("expected <TS> root element, found <{}>", element_name(&e)),
                ));
            }
            Event::Text(e) if !e.iter().all(u8::is_ascii_whitespace) => {
                return Err(malformed(&reader, "text outside of the <TS> root element"));
            }
            Event::Eof => return Err(malformed(&reader, "missing <TS> root element")),
            _ => {}
        }
    }
}

/// Whether `text` opens with a `<TS>` root element.
///
/// Only the prolog and the root start tag are read, so a prefix of the
/// document is enough.
#[must_use]
pub fn is_translation_document(text: &str) -> bool {
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => return e.name().as_ref() == b"TS",
            Ok(Event::Text(e)) if !e.iter().all(u8::is_ascii_whitespace) => return false,
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

fn expect_document_end(reader: &mut XmlReader<'_>) -> Result<(), CatalogError> {
    loop {
        match next_event(reader)? {
            Event::Eof => return Ok(()),
            Event::Start(e) | Event::Empty(e) => {
                return Err(malformed(
                    reader,
                    format!("unexpected element <{}> after the root element", element_name(&e)),
                ));
            }
            Event::Text(e) if !e.iter().all(u8::is_ascii_whitespace) => {
                return Err(malformed(reader, "text after the root element"));
            }
            _ => {}
        }
    }
}

fn parse_root(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<TranslationFile, CatalogError> {
    let mut file = TranslationFile {
        language: attribute(reader, start, "language")?.and_then(non_empty),
        source_language: attribute(reader, start, "sourcelanguage")?.and_then(non_empty),
        version: attribute(reader, start, "version")?,
        contexts: Vec::new(),
    };

    if !has_children {
        return Ok(file);
    }

    loop {
        match next_event(reader)? {
            Event::Start(e) if e.name().as_ref() == b"context" => {
                file.contexts.push(parse_context(reader, &e)?);
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(file),
            Event::Eof => return Err(malformed(reader, "unexpected end of document in <TS>")),
            _ => {}
        }
    }
}

fn parse_context(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<Context, CatalogError> {
    let mut name = None;
    let mut comment = None;
    let mut messages = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.name().as_ref() {
                b"name" => name = Some(read_text(reader, e.name())?),
                b"comment" => comment = non_empty(read_text(reader, e.name())?),
                b"message" => messages.push(parse_message(reader, &e)?),
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.name().as_ref() == b"name" => name = Some(String::new()),
            Event::End(e) if e.name() == start.name() => break,
            Event::Eof => return Err(malformed(reader, "unexpected end of document in <context>")),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| malformed(reader, "<context> without <name>"))?;
    Ok(Context { name, comment, messages })
}

fn parse_location(
    reader: &XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<Location, CatalogError> {
    let filename = attribute(reader, start, "filename")?;
    let line = attribute(reader, start, "line")?.and_then(|line| match line.parse::<LineNumber>() {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::debug!("Ignoring invalid location line '{line}': {e}");
            None
        }
    });

    Ok(Location { filename, line })
}

fn parse_message(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<Message, CatalogError> {
    let numerus = attribute(reader, start, "numerus")?.is_some_and(|value| value == "yes");
    let id = attribute(reader, start, "id")?;

    let mut source = None;
    let mut message = Message { id, ..Message::default() };
    let mut translation = None;

    loop {
        match next_event(reader)? {
            Event::Empty(e) if e.name().as_ref() == b"location" => {
                message.locations.push(parse_location(reader, &e)?);
            }
            Event::Empty(e) => match e.name().as_ref() {
                b"source" => source = Some(String::new()),
                b"translation" => translation = Some(parse_translation(reader, &e, numerus, false)?),
                _ => {}
            },
            Event::Start(e) => match e.name().as_ref() {
                b"location" => {
                    message.locations.push(parse_location(reader, &e)?);
                    skip_element(reader, &e)?;
                }
                b"source" => source = Some(read_text(reader, e.name())?),
                b"oldsource" => message.old_source = non_empty(read_text(reader, e.name())?),
                b"comment" => message.comment = non_empty(read_text(reader, e.name())?),
                b"extracomment" => message.extra_comment = non_empty(read_text(reader, e.name())?),
                b"translatorcomment" => {
                    message.translator_comment = non_empty(read_text(reader, e.name())?);
                }
                b"translation" => translation = Some(parse_translation(reader, &e, numerus, true)?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name() == start.name() => break,
            Event::Eof => return Err(malformed(reader, "unexpected end of document in <message>")),
            _ => {}
        }
    }

    message.source = source.ok_or_else(|| malformed(reader, "<message> without <source>"))?;

    let (status, text) = translation.unwrap_or_else(|| {
        let empty = if numerus { TranslationText::Numerus(Vec::new()) } else { TranslationText::default() };
        (TranslationStatus::Unfinished, empty)
    });
    message.status = status;
    message.translation = text;

    Ok(message)
}

fn parse_translation(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    numerus: bool,
    has_children: bool,
) -> Result<(TranslationStatus, TranslationText), CatalogError> {
    let status = attribute(reader, start, "type")?
        .map_or(Ok(TranslationStatus::Finished), |value| value.parse())
        .map_err(|message| malformed(reader, message))?;

    let text = match (numerus, has_children) {
        (false, false) => TranslationText::default(),
        (false, true) => TranslationText::Single(read_text(reader, start.name())?),
        (true, false) => TranslationText::Numerus(Vec::new()),
        (true, true) => TranslationText::Numerus(read_numerus_forms(reader, start)?),
    };

    Ok((status, text))
}

fn read_numerus_forms(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
) -> Result<Vec<String>, CatalogError> {
    let mut forms = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                forms.push(read_text(reader, e.name())?);
            }
            Event::Empty(e) if e.name().as_ref() == b"numerusform" => forms.push(String::new()),
            Event::Start(e) | Event::Empty(e) => {
                return Err(malformed(
                    reader,
                    format!("unexpected element <{}> in numerus translation", element_name(&e)),
                ));
            }
            Event::Text(e) if !e.iter().all(u8::is_ascii_whitespace) => {
                return Err(malformed(reader, "text outside of <numerusform>"));
            }
            Event::End(e) if e.name() == start.name() => return Ok(forms),
            Event::Eof => return Err(malformed(reader, "unexpected end of document in <translation>")),
            _ => {}
        }
    }
}

/// Read and parse a `.ts` file.
///
/// When the document carries no `language` attribute, the language is
/// guessed from the file name (`photo_broom_pl.ts` -> `pl`).
pub fn load_translation_file(file_path: &Path) -> Result<TranslationFile, CatalogError> {
    let content =
        std::fs::read_to_string(file_path).map_err(|e| CatalogError::io(file_path, e))?;

    let mut file = parse_document(&content)?;
    if file.language.is_none() {
        file.language = detect_language_from_path(file_path);
    }

    tracing::debug!(
        path = %file_path.display(),
        language = ?file.language,
        contexts = file.contexts.len(),
        messages = file.message_count(),
        "Loaded translation file"
    );

    Ok(file)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn parse_messages(body: &str) -> Vec<Message> {
        let document = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="pl_PL">
<context>
    <name>Test</name>
{body}
</context>
</TS>"#
        );
        let mut file = parse_document(&document).unwrap();
        file.contexts.remove(0).messages
    }

    #[rstest]
    #[case::full_prolog("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"pl_PL\">\n<context>", true)]
    #[case::empty_root("<TS/>", true)]
    #[case::typescript("import { foo } from \"./foo\";\nexport const bar: Array<string> = [];\n", false)]
    #[case::typescript_generic_first("const tags = new Map<string, number>();", false)]
    #[case::other_xml("<?xml version=\"1.0\"?><RCC><qresource/></RCC>", false)]
    #[case::empty("", false)]
    fn test_is_translation_document(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_translation_document(text), expected);
    }

    #[googletest::test]
    fn test_parse_root_attributes() {
        let file = parse_document(r#"<TS version="2.1" language="pl_PL" sourcelanguage="en"/>"#)
            .unwrap();

        expect_that!(file.version.as_deref(), some(eq("2.1")));
        expect_that!(file.language.as_deref(), some(eq("pl_PL")));
        expect_that!(file.source_language.as_deref(), some(eq("en")));
        expect_that!(file.contexts.len(), eq(0));
    }

    #[googletest::test]
    fn test_parse_finished_message_with_locations() {
        let messages = parse_messages(
            r#"    <message>
        <location filename="../src/core/implementation/base_tags.cpp" line="+33"/>
        <location line="-3"/>
        <source>People</source>
        <translation>Osoby</translation>
    </message>"#,
        );

        expect_that!(messages.len(), eq(1));
        let message = &messages[0];
        expect_that!(message.source.as_str(), eq("People"));
        expect_that!(message.status, eq(TranslationStatus::Finished));
        assert_eq!(message.translation, TranslationText::Single("Osoby".to_string()));
        assert_eq!(
            message.locations,
            vec![
                Location {
                    filename: Some("../src/core/implementation/base_tags.cpp".to_string()),
                    line: Some(LineNumber::Relative(33)),
                },
                Location { filename: None, line: Some(LineNumber::Relative(-3)) },
            ]
        );
    }

    #[googletest::test]
    fn test_parse_numerus_message() {
        let messages = parse_messages(
            r#"    <message numerus="yes">
        <location line="+7"/>
        <source>Done. %n new photo(s) found.</source>
        <translation>
            <numerusform>Zakończono. Znaleziono %n nowe zdjęcie.</numerusform>
            <numerusform>Zakończono. Znaleziono %n nowe zdjęcia.</numerusform>
            <numerusform>Zakończono. Znaleziono %n nowych zdjęć.</numerusform>
        </translation>
    </message>"#,
        );

        assert_eq!(
            messages[0].translation,
            TranslationText::Numerus(vec![
                "Zakończono. Znaleziono %n nowe zdjęcie.".to_string(),
                "Zakończono. Znaleziono %n nowe zdjęcia.".to_string(),
                "Zakończono. Znaleziono %n nowych zdjęć.".to_string(),
            ])
        );
    }

    #[rstest]
    #[case(r#"<translation type="unfinished"></translation>"#, TranslationStatus::Unfinished)]
    #[case(r#"<translation type="unfinished"/>"#, TranslationStatus::Unfinished)]
    #[case(r#"<translation type="vanished">&amp;Wszystkie zdjęcia</translation>"#, TranslationStatus::Vanished)]
    #[case(r#"<translation type="obsolete">Edytor tagów</translation>"#, TranslationStatus::Obsolete)]
    #[case("<translation>&amp;Nowe zdjęcia</translation>", TranslationStatus::Finished)]
    #[case("", TranslationStatus::Unfinished)]
    fn test_parse_translation_status(#[case] translation: &str, #[case] expected: TranslationStatus) {
        let body = format!("<message><source>x</source>{translation}</message>");
        let messages = parse_messages(&body);

        assert_eq!(messages[0].status, expected);
    }

    #[googletest::test]
    fn test_entities_and_markup_are_unescaped() {
        let messages = parse_messages(
            r"<message>
        <source>New version of PhotoBroom is available &lt;a href=&quot;%1&quot;&gt;here&lt;/a&gt;.</source>
        <translation>Nowa wersja programu PhotoBroom jest dostępna &lt;a href=&quot;%1&quot;&gt;tutaj&lt;/a&gt;.</translation>
    </message>",
        );

        expect_that!(
            messages[0].source.as_str(),
            eq(r#"New version of PhotoBroom is available <a href="%1">here</a>."#)
        );
        assert_eq!(
            messages[0].translation,
            TranslationText::Single(
                r#"Nowa wersja programu PhotoBroom jest dostępna <a href="%1">tutaj</a>."#.to_string()
            )
        );
    }

    #[googletest::test]
    fn test_multiline_text_is_preserved() {
        let messages = parse_messages(
            "<message>
        <source>There are no photos in your collection.

Add some by choosing &apos;Add photos&apos; action from &apos;Photos&apos; menu.</source>
        <translation type=\"vanished\">W twojej kolekcji nie ma żadnych zdjęć.</translation>
    </message>",
        );

        expect_that!(
            messages[0].source.as_str(),
            eq("There are no photos in your collection.\n\nAdd some by choosing 'Add photos' action from 'Photos' menu.")
        );
    }

    #[googletest::test]
    fn test_comments_and_byte_escapes() {
        let messages = parse_messages(
            r#"<message id="open.action">
        <source>Open</source>
        <comment>menu</comment>
        <extracomment>File menu entry</extracomment>
        <translatorcomment>checked</translatorcomment>
        <translation>Otwórz<byte value="x9"/>Ctrl+O</translation>
        <userdata>ignored</userdata>
    </message>"#,
        );

        let message = &messages[0];
        expect_that!(message.comment.as_deref(), some(eq("menu")));
        expect_that!(message.extra_comment.as_deref(), some(eq("File menu entry")));
        expect_that!(message.translator_comment.as_deref(), some(eq("checked")));
        expect_that!(message.id.as_deref(), some(eq("open.action")));
        assert_eq!(message.translation, TranslationText::Single("Otwórz\tCtrl+O".to_string()));
    }

    #[rstest]
    #[case::not_xml("this is not xml")]
    #[case::wrong_root("<catalog/>")]
    #[case::missing_source("<TS><context><name>A</name><message><translation>x</translation></message></context></TS>")]
    #[case::missing_name("<TS><context><message><source>x</source></message></context></TS>")]
    #[case::unclosed("<TS><context><name>A</name>")]
    #[case::mismatched("<TS><context><name>A</context></TS>")]
    #[case::unknown_type(r#"<TS><context><name>A</name><message><source>x</source><translation type="done">y</translation></message></context></TS>"#)]
    #[case::element_in_text("<TS><context><name>A<b>bold</b></name></context></TS>")]
    #[case::text_in_numerus(r#"<TS><context><name>A</name><message numerus="yes"><source>x</source><translation>y</translation></message></context></TS>"#)]
    fn test_malformed_documents(#[case] document: &str) {
        let result = parse_document(document);

        assert!(matches!(result, Err(CatalogError::Malformed { .. })), "{result:?}");
    }

    #[googletest::test]
    fn test_load_translation_file_detects_language_from_name() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("photo_broom_pl.ts");
        std::fs::write(&path, "<TS version=\"2.1\"></TS>").unwrap();

        let file = load_translation_file(&path).unwrap();

        expect_that!(file.language.as_deref(), some(eq("pl")));
    }

    #[googletest::test]
    fn test_load_translation_file_missing() {
        let result = load_translation_file(Path::new("/nonexistent/photo_broom_pl.ts"));

        expect_that!(matches!(result, Err(CatalogError::Io { .. })), eq(true));
    }
}
