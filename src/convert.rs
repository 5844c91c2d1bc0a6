//! The conversion pipeline: profile in, Cobertura report out.
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::aggregate;
use crate::config::Config;
use crate::declarations::Extractor;
use crate::error::Result;
use crate::model::{Coverage, Profile};
use crate::parsers::gocover;
use crate::report;

pub struct Converter {
    config: Config,
    extractor: Extractor,
}

impl Converter {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            extractor: Extractor::new()?,
        })
    }

    /// Build the report model for `profiles`, in order. Files that can't be
    /// located or parsed are logged and left out.
    pub fn build(&mut self, profiles: &[Profile], timestamp: i64) -> Coverage {
        let mut coverage = Coverage::new(self.config.sources.to_sources(), timestamp);
        for profile in profiles {
            if let Err(e) = self.add_profile(&mut coverage, profile) {
                warn!(file = %profile.file_name, "skipping file: {}", e);
            }
        }
        coverage
    }

    fn add_profile(&mut self, coverage: &mut Coverage, profile: &Profile) -> Result<()> {
        if self.config.ignore.skips_profile(profile) {
            debug!(file = %profile.file_name, "ignored by pattern");
            return Ok(());
        }

        let path = self.config.sources.locate(&profile.file_name)?;
        let source = fs::read_to_string(&path)?;
        if self.config.ignore.skips_source(&source) {
            debug!(file = %profile.file_name, "ignored generated file");
            return Ok(());
        }

        // Syntax errors name the file relative to its root.
        let display = self.config.sources.strip_known_sources(&path);
        let declarations = self.extractor.extract(Path::new(&display), &source)?;
        let classes = aggregate::file_classes(&profile.file_name, &declarations, &profile.blocks);
        debug!(
            file = %profile.file_name,
            blocks = profile.blocks.len(),
            classes = classes.len(),
            "merged profile"
        );
        aggregate::add_classes(coverage, profile.package_name(), classes);
        Ok(())
    }
}

/// Convert the profile read from `input` and write the report to `out`,
/// stamped with the current time.
pub fn convert<R: BufRead, W: Write>(input: R, out: W, config: Config) -> Result<()> {
    convert_at(input, out, config, chrono::Utc::now().timestamp_millis())
}

/// Like [`convert`] with a fixed timestamp. Nothing is written to `out`
/// unless the whole profile parses.
pub fn convert_at<R: BufRead, W: Write>(
    mut input: R,
    out: W,
    config: Config,
    timestamp: i64,
) -> Result<()> {
    let profiles = gocover::parse_reader(&mut input)?;
    debug!(files = profiles.len(), "parsed coverage profile");

    let mut converter = Converter::new(config)?;
    let coverage = converter.build(&profiles, timestamp);
    report::write_report(&coverage, out)
}
