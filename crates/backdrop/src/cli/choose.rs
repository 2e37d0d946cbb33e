//! Selection command handler.

use backdrop::{Backdrop, BackdropResult, CollectionSource, MediaType, SelectionMode, SelectionState};

/// Arguments of `backdrop choose`.
#[derive(Debug, Clone)]
pub struct ChooseOptions {
    pub mode: SelectionMode,
    pub source: CollectionSource,
    pub media_type: MediaType,
    pub last: Option<String>,
    pub pin: Option<String>,
    pub exclude: Option<String>,
    pub resolve: bool,
}

impl ChooseOptions {
    fn state(&self) -> SelectionState {
        let mut state = SelectionState::default()
            .with_mode(self.mode)
            .with_collection_source(self.source)
            .with_media_type(self.media_type);
        if let Some(last) = &self.last {
            state = state.with_last_selected_id(last.clone());
        }
        if let Some(pin) = &self.pin {
            state = state.with_pinned_id(pin.clone());
        }
        state
    }
}

/// Print the entry the rotation policy would present next.
pub async fn choose(backdrop: &Backdrop, options: ChooseOptions) -> BackdropResult<()> {
    let state = options.state();

    if options.resolve {
        match backdrop.resolve_wallpaper(&state).await {
            Some(wallpaper) => println!(
                "{}\t{}\t{} bytes from {}",
                wallpaper.entry.id,
                wallpaper.entry.display_name(),
                wallpaper.payload.len(),
                wallpaper.source
            ),
            None => println!("No wallpaper available"),
        }
        return Ok(());
    }

    match backdrop.choose_entry(&state, options.exclude.as_deref()).await {
        Some(entry) => println!("{}\t{}", entry.id, entry.display_name()),
        None => println!("No wallpaper available"),
    }
    Ok(())
}
