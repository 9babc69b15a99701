//! `.ts` document writer.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{
    BytesDecl,
    BytesEnd,
    BytesStart,
    BytesText,
    Event,
};

use crate::error::CatalogError;
use crate::ir::{
    Context,
    Message,
    TranslationFile,
    TranslationText,
};
use crate::types::Location;

type XmlWriter = Writer<Vec<u8>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), CatalogError> {
    writer.write_event(event).map_err(|e| CatalogError::Serialize(e.to_string()))
}

/// Characters XML 1.0 cannot carry, written as `<byte value="xNN"/>` like `lupdate` does.
const fn needs_byte_escape(ch: char) -> bool {
    ch < ' ' && ch != '\n' && ch != '\t'
}

fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_byte_escape) {
        return escape(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    let mut run_start = 0;
    for (index, ch) in text.char_indices() {
        if needs_byte_escape(ch) {
            escaped.push_str(&escape(text.get(run_start..index).unwrap_or_default()));
            let _ = write!(escaped, "<byte value=\"x{:x}\"/>", u32::from(ch));
            run_start = index + ch.len_utf8();
        }
    }
    escaped.push_str(&escape(text.get(run_start..).unwrap_or_default()));
    Cow::Owned(escaped)
}

/// Element text as a single event, so the indenting writer never breaks it.
fn write_text(writer: &mut XmlWriter, text: &str) -> Result<(), CatalogError> {
    write(writer, Event::Text(BytesText::from_escaped(escape_text(text))))
}

/// `<name>text</name>`, text always inline so whitespace survives a re-read.
fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), CatalogError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write_text(writer, text)?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_optional(
    writer: &mut XmlWriter,
    name: &str,
    text: Option<&str>,
) -> Result<(), CatalogError> {
    text.map_or(Ok(()), |text| write_text_element(writer, name, text))
}

/// Serialize a translation file in the layout `lupdate` produces.
pub fn to_ts_string(file: &TranslationFile) -> Result<String, CatalogError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write(&mut writer, Event::DocType(BytesText::from_escaped("TS")))?;

    let mut root = BytesStart::new("TS");
    if let Some(version) = &file.version {
        root.push_attribute(("version", version.as_str()));
    }
    if let Some(language) = &file.language {
        root.push_attribute(("language", language.as_str()));
    }
    if let Some(source_language) = &file.source_language {
        root.push_attribute(("sourcelanguage", source_language.as_str()));
    }
    write(&mut writer, Event::Start(root))?;

    for context in &file.contexts {
        write_context(&mut writer, context)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("TS")))?;

    let mut output = String::from_utf8(writer.into_inner())
        .map_err(|e| CatalogError::Serialize(e.to_string()))?;
    output.push('\n');
    Ok(output)
}

fn write_context(writer: &mut XmlWriter, context: &Context) -> Result<(), CatalogError> {
    write(writer, Event::Start(BytesStart::new("context")))?;
    write_text_element(writer, "name", &context.name)?;
    write_optional(writer, "comment", context.comment.as_deref())?;

    for message in &context.messages {
        write_message(writer, message)?;
    }

    write(writer, Event::End(BytesEnd::new("context")))
}

fn write_location(writer: &mut XmlWriter, location: &Location) -> Result<(), CatalogError> {
    let mut element = BytesStart::new("location");
    if let Some(filename) = &location.filename {
        element.push_attribute(("filename", filename.as_str()));
    }
    if let Some(line) = location.line {
        element.push_attribute(("line", line.to_string().as_str()));
    }
    write(writer, Event::Empty(element))
}

fn write_message(writer: &mut XmlWriter, message: &Message) -> Result<(), CatalogError> {
    let mut element = BytesStart::new("message");
    if let Some(id) = &message.id {
        element.push_attribute(("id", id.as_str()));
    }
    if message.is_numerus() {
        element.push_attribute(("numerus", "yes"));
    }
    write(writer, Event::Start(element))?;

    for location in &message.locations {
        write_location(writer, location)?;
    }
    write_text_element(writer, "source", &message.source)?;
    write_optional(writer, "oldsource", message.old_source.as_deref())?;
    write_optional(writer, "comment", message.comment.as_deref())?;
    write_optional(writer, "extracomment", message.extra_comment.as_deref())?;
    write_optional(writer, "translatorcomment", message.translator_comment.as_deref())?;

    let mut translation = BytesStart::new("translation");
    if let Some(status) = message.status.as_attribute() {
        translation.push_attribute(("type", status));
    }
    write(writer, Event::Start(translation))?;
    match &message.translation {
        TranslationText::Single(text) => write_text(writer, text)?,
        TranslationText::Numerus(forms) => {
            for form in forms {
                write_text_element(writer, "numerusform", form)?;
            }
        }
    }
    write(writer, Event::End(BytesEnd::new("translation")))?;

    write(writer, Event::End(BytesEnd::new("message")))
}

/// Serialize and write a translation file to disk.
pub fn write_translation_file(path: &Path, file: &TranslationFile) -> Result<(), CatalogError> {
    let content = to_ts_string(file)?;
    std::fs::write(path, content).map_err(|e| CatalogError::io(path, e))?;

    tracing::debug!(path = %path.display(), messages = file.message_count(), "Wrote translation file");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::input::parse_document;
    use crate::types::{
        LineNumber,
        TranslationStatus,
    };

    fn sample_file() -> TranslationFile {
        let mut file = TranslationFile::new("pl_PL");

        let mut open = Message::new("Open", "Otwórz");
        open.locations.push(Location {
            filename: Some("../src/gui/desktop/ui/mainwindow.ui".to_string()),
            line: Some(LineNumber::Relative(14)),
        });
        open.locations.push(Location { filename: None, line: Some(LineNumber::Relative(-3)) });

        let mut link = Message::new(
            "New version of PhotoBroom is available <a href=\"%1\">here</a>.",
            "Nowa wersja programu PhotoBroom jest dostępna <a href=\"%1\">tutaj</a>.",
        );
        link.extra_comment = Some("Shown in the status bar".to_string());

        file.contexts.push(
            Context::new("MainWindow")
                .with_message(open)
                .with_message(link)
                .with_message(
                    Message::new("&Reviewed photos", "").with_status(TranslationStatus::Unfinished),
                )
                .with_message(
                    Message::new("&All photos", "&Wszystkie zdjęcia")
                        .with_status(TranslationStatus::Vanished),
                )
                .with_message(
                    Message::new("Tags editor", "Edytor tagów").with_status(TranslationStatus::Obsolete),
                )
                .with_message(Message::new("Open", "Otwarte").with_comment("state")),
        );
        file.contexts.push(Context::new("CollectionDirScanDialog").with_message(Message::numerus(
            "Done. %n new photo(s) found.",
            [
                "Zakończono. Znaleziono %n nowe zdjęcie.",
                "Zakończono. Znaleziono %n nowe zdjęcia.",
                "Zakończono. Znaleziono %n nowych zdjęć.",
            ],
        )));
        file.contexts.push(Context::new("PhotosWidget").with_message(Message::new(
            "There are no photos in your collection.\n\nAdd some by choosing 'Add photos' action.",
            "W twojej kolekcji nie ma żadnych zdjęć.\n\nWybierz \"Dodaj zdjęcia\".",
        )));

        file
    }

    #[googletest::test]
    fn test_round_trip_preserves_everything() {
        let file = sample_file();

        let text = to_ts_string(&file).unwrap();
        let reparsed = parse_document(&text).unwrap();

        assert_eq!(reparsed, file);
    }

    #[googletest::test]
    fn test_output_layout() {
        let mut file = TranslationFile::new("pl_PL");
        file.contexts.push(
            Context::new("BaseTags")
                .with_message(Message::new("People", "Osoby"))
                .with_message(Message::new("Place", "").with_status(TranslationStatus::Unfinished)),
        );

        let text = to_ts_string(&file).unwrap();

        assert_eq!(
            text,
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="pl_PL">
    <context>
        <name>BaseTags</name>
        <message>
            <source>People</source>
            <translation>Osoby</translation>
        </message>
        <message>
            <source>Place</source>
            <translation type="unfinished"></translation>
        </message>
    </context>
</TS>
"#
        );
    }

    #[googletest::test]
    fn test_markup_is_escaped() {
        let mut file = TranslationFile::new("pl_PL");
        file.contexts.push(Context::new("A").with_message(Message::new("<b>%1</b> & more", "x")));

        let text = to_ts_string(&file).unwrap();

        expect_that!(text.as_str(), contains_substring("<source>&lt;b&gt;%1&lt;/b&gt; &amp; more</source>"));
    }

    #[googletest::test]
    fn test_control_characters_become_byte_escapes() {
        let mut file = TranslationFile::new("pl_PL");
        file.contexts.push(
            Context::new("A")
                .with_message(Message::new("Open\u{1b}[1m", "Otwórz\u{1b}[1m\tteraz\r"))
                .with_message(Message::numerus("%n item(s)", ["%n\u{7}", "%n\u{1}", "%n"])),
        );

        let text = to_ts_string(&file).unwrap();

        expect_that!(text.as_str(), contains_substring(r#"<source>Open<byte value="x1b"/>[1m</source>"#));
        expect_that!(
            text.as_str(),
            contains_substring("<translation>Otwórz<byte value=\"x1b\"/>[1m\tteraz<byte value=\"xd\"/></translation>")
        );
        expect_that!(text.as_str(), contains_substring(r#"<numerusform>%n<byte value="x7"/></numerusform>"#));
        expect_that!(text.chars().any(|ch| ch < ' ' && ch != '\n' && ch != '\t'), eq(false));
        assert_eq!(parse_document(&text).unwrap(), file);
    }

    #[googletest::test]
    fn test_write_translation_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("out_pl.ts");

        write_translation_file(&path, &sample_file()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        expect_that!(content.as_str(), starts_with("<?xml"));
        expect_that!(parse_document(&content).unwrap().message_count(), eq(8));
    }
}
