use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use shopfit::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress events on a single stderr progress bar.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = Arc::clone(&self.pb);

        Box::new(move |progress: Progress| {
            let Ok(mut guard) = pb.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    guard.reset();
                    guard.set_length(0);
                    guard.set_style(Self::spinner_style());
                    guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    guard.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    guard.disable_steady_tick();
                    guard.finish_with_message("Done");
                }
                Progress::TaskStart { total_steps } => {
                    guard.disable_steady_tick();
                    guard.reset();
                    guard.set_length(total_steps);
                    guard.set_position(0);
                    guard.set_style(Self::bar_style());
                }
                Progress::TaskIncrement => guard.inc(1),
                Progress::TaskFinish => {
                    // Early stops leave the bar short of its length.
                    let length = guard.length().unwrap_or(0);
                    if guard.position() < length {
                        guard.set_position(length);
                    }
                    guard.finish();
                }
                Progress::StatusUpdate { text } => guard.set_message(text),
                Progress::Message(msg) => {
                    if guard.is_finished() {
                        guard.set_message(msg);
                    } else {
                        guard.println(format!("  {msg}"));
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<32} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            })
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_search_task() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Search" });
        assert_eq!(handler.pb.lock().unwrap().message(), "Search");

        callback(Progress::TaskStart { total_steps: 50 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        assert_eq!(handler.pb.lock().unwrap().position(), 2);

        callback(Progress::StatusUpdate {
            text: "SA temperature: 4.200".to_string(),
        });
        assert_eq!(handler.pb.lock().unwrap().message(), "SA temperature: 4.200");

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 50);
        }

        callback(Progress::PhaseFinish);
        assert_eq!(handler.pb.lock().unwrap().message(), "Done");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Finalize" });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(handler.pb.lock().unwrap().is_finished());
    }
}
