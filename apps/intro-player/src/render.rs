use intro_sequence::{IntroState, PresenterView};
use tokio::sync::watch;

/// One line of terminal output for a presenter frame
pub fn frame(view: &PresenterView) -> Option<String> {
	match view {
		PresenterView::Empty => None,
		PresenterView::Text { text, cursor } => {
			let line = text.replace('\n', " ");
			Some(if *cursor { format!("{line}_") } else { line })
		}
		PresenterView::Images { layout, shown, current } => Some(format!("[{layout:?}] {} ({})", current.as_deref().unwrap_or("-"), shown.len())),
		PresenterView::Composite { text, current } => {
			let overlay = text.as_deref().map(|t| t.replace('\n', " / ")).unwrap_or_default();
			Some(format!("[{}] {overlay}", current.as_deref().unwrap_or("-")))
		}
		PresenterView::Video { reference } => Some(format!("[video {reference}]")),
	}
}

/// Print each new frame until the player goes away
pub async fn follow(mut rx: watch::Receiver<IntroState>) {
	let mut last: Option<String> = None;
	let mut last_scene: Option<String> = None;

	loop {
		{
			let state = rx.borrow_and_update();
			if state.active_scene != last_scene {
				if let Some(scene) = &state.active_scene {
					println!("\n== {scene} ({}/{})", (state.scene_index + 1).min(state.scene_count), state.scene_count);
				}
				last_scene.clone_from(&state.active_scene);
			}

			let current = frame(&state.presenter);
			if current.is_some() && current != last {
				if let Some(line) = &current {
					println!("   {line}");
				}
				last = current;
			}
		}

		if rx.changed().await.is_err() {
			break;
		}
	}
}
