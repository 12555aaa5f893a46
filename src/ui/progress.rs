use crate::source::PhotoSource;
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Progress for `warm`, tallying which tier answered each place
pub struct WarmProgress {
    pb: ProgressBar,
    tally: Vec<(PhotoSource, usize)>,
}

impl WarmProgress {
    pub fn new(total: usize) -> Self {
        let pb = if console::Term::stdout().is_term() {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
                pb.set_style(style.progress_chars("=> "));
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        Self { pb, tally: Vec::new() }
    }

    pub fn start(&self, place_name: &str) {
        self.pb.set_message(place_name.to_string());
    }

    pub fn record(&mut self, source: PhotoSource) {
        match self.tally.iter_mut().find(|(s, _)| *s == source) {
            Some((_, count)) => *count += 1,
            None => self.tally.push((source, 1)),
        }
        self.pb.inc(1);
    }

    pub fn tally(&self) -> &[(PhotoSource, usize)] {
        &self.tally
    }

    pub fn finish_with_summary(&self, duration: Duration) {
        self.pb.finish_and_clear();
        let total: usize = self.tally.iter().map(|(_, n)| n).sum();
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Warmed {} places in {}", total, HumanDuration(duration)).style(theme().success.clone())
        );
        for (source, count) in &self.tally {
            println!("  {} {} {}", Icons::CAMERA.style(theme().info.clone()), source, count);
        }
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_groups_sources() {
        let mut progress = WarmProgress::new(3);
        progress.record(PhotoSource::Curated);
        progress.record(PhotoSource::Fallback);
        progress.record(PhotoSource::Curated);

        assert_eq!(
            progress.tally(),
            &[(PhotoSource::Curated, 2), (PhotoSource::Fallback, 1)]
        );
    }
}
