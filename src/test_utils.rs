//! Shared fixtures for unit tests.
#![cfg(test)]

use crate::ir::{
    Context,
    Message,
    TranslationFile,
};
use crate::types::{
    LineNumber,
    Location,
    TranslationStatus,
};

/// A small Polish catalog covering every status, a disambiguated message
/// and a three-form numerus message.
pub(crate) fn photo_broom_file() -> TranslationFile {
    let mut open = Message::new("Open", "Otwórz");
    open.locations.push(Location {
        filename: Some("../src/gui/desktop/ui/mainwindow.ui".to_string()),
        line: Some(LineNumber::Relative(14)),
    });

    let main_window = Context::new("MainWindow")
        .with_message(open)
        .with_message(Message::new("Open", "Otwarte").with_comment("state"))
        .with_message(Message::new("&Reviewed photos", "").with_status(TranslationStatus::Unfinished))
        .with_message(
            Message::new("&All photos", "&Wszystkie zdjęcia").with_status(TranslationStatus::Vanished),
        )
        .with_message(Message::new("Tags editor", "Edytor tagów").with_status(TranslationStatus::Obsolete));

    let scan_dialog = Context::new("CollectionDirScanDialog")
        .with_message(Message::new("Cancel", "Anuluj"))
        .with_message(Message::numerus(
            "Done. %n new photo(s) found.",
            [
                "Zakończono. Znaleziono %n nowe zdjęcie.",
                "Zakończono. Znaleziono %n nowe zdjęcia.",
                "Zakończono. Znaleziono %n nowych zdjęć.",
            ],
        ));

    let photos_widget = Context::new("PhotosWidget")
        .with_message(Message::new("Search:", "Szukaj:").with_status(TranslationStatus::Unfinished));

    TranslationFile {
        contexts: vec![main_window, scan_dialog, photos_widget],
        ..TranslationFile::new("pl_PL")
    }
}
