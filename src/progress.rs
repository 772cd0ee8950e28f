// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Human-readable progress output.
//!
//! Result lines go to the supplied writer (stdout for the binary) so they
//! can be captured by CI logs. While a step is running, a spinner is drawn
//! on stderr; indicatif hides it automatically when stderr is not a
//! terminal.

use std::{io::Write, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

/// Line-oriented progress log with an optional spinner.
pub struct Progress<W: Write> {
    out:     W,
    spinner: ProgressBar
}

impl<W: Write> Progress<W> {
    /// Creates a log writing to `out` with a spinner on stderr.
    pub fn new(out: W) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.yellow} [{elapsed_precise}] {msg}")
                .expect("valid template")
        );
        Self {
            out,
            spinner
        }
    }

    /// Creates a log writing to `out` without any spinner.
    pub fn hidden(out: W) -> Self {
        Self {
            out,
            spinner: ProgressBar::hidden()
        }
    }

    /// Shows `message` next to the spinner until the next line is written.
    pub fn step(&self, message: impl Into<String>) {
        if self.spinner.is_hidden() {
            return;
        }
        self.spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner.set_message(message.into());
    }

    pub fn start(&mut self, message: &str) {
        self.line(&format!("🚀 {message}\n"));
    }

    pub fn success(&mut self, message: &str) {
        self.line(&format!("✅ {message}"));
    }

    pub fn failure(&mut self, message: &str) {
        self.line(&format!("❌ {message}"));
    }

    pub fn removed(&mut self, message: &str) {
        self.line(&format!("🗑️ {message}"));
    }

    pub fn badge(&mut self, reference: &str) {
        self.line(&format!("\n🎉 Endpoint Badge: {reference}"));
    }

    /// Clears the spinner and hands back the writer.
    pub fn finish(self) -> W {
        self.spinner.finish_and_clear();
        self.out
    }

    fn line(&mut self, text: &str) {
        let out = &mut self.out;
        // write errors are ignored
        self.spinner.suspend(|| {
            let _ = writeln!(out, "{text}");
            let _ = out.flush();
        });
    }
}
