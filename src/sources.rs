/// Provenance tag carried by every stored stat record. Trust ranking lives
/// here and nowhere else: anything that orders records by origin goes through
/// `priority`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Hand-maintained starter charts.
    Starters,
    /// Curated roster files.
    Roster,
    /// Automated API pulls.
    Api,
    /// Heuristic scraped data.
    Scraped,
    /// Synthetic generator output.
    Sample,
    /// Unrecognized tag, preserved verbatim.
    Other(String),
}

impl Source {
    pub fn parse(tag: &str) -> Source {
        let trimmed = tag.trim();
        match trimmed.to_lowercase().as_str() {
            "starters" => Source::Starters,
            "roster" => Source::Roster,
            "api" => Source::Api,
            "scraped" => Source::Scraped,
            "sample" => Source::Sample,
            _ => Source::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Source::Starters => "starters",
            Source::Roster => "roster",
            Source::Api => "api",
            Source::Scraped => "scraped",
            Source::Sample => "sample",
            Source::Other(tag) => tag.as_str(),
        }
    }

    /// Lower sorts first. Unrecognized tags rank behind everything known.
    pub fn priority(&self) -> u8 {
        match self {
            Source::Starters => 1,
            Source::Roster => 2,
            Source::Api => 3,
            Source::Scraped => 4,
            Source::Sample => 5,
            Source::Other(_) => 6,
        }
    }
}
