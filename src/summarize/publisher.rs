//! Publisher classification
//!
//! Exact-name tables are checked first within each class, then substring
//! heuristics on the lowercased name. Classes are tried in a fixed order and
//! the first match wins.

use serde::Serialize;
use std::fmt;

pub const BIG5_PUBLISHERS: &[&str] = &[
    "Elsevier",
    "Informa UK (Taylor & Francis)",
    "Springer-Verlag",
    "SAGE Publications",
    "Wiley (Blackwell Publishing)",
    "Wiley (John Wiley & Sons)",
    "Springer (Biomed Central Ltd.)",
    "Springer Nature",
];

pub const COMMERCIAL_PUBLISHERS: &[&str] = &[
    "Peter Lang International Academic Publishers",
    "Walter de Gruyter GmbH",
    "Oldenbourg Wissenschaftsverlag",
    "Georg Thieme Verlag KG",
    "Emerald (MCB UP )",
    "Medknow Publications",
    "Inderscience Enterprises Ltd",
    "Bentham Science",
    "Ovid Technologies (Wolters Kluwer)  - Lippincott Williams & Wilkins",
    "Scientific Research Publishing, Inc",
    "MDPI AG",
    "S. Karger AG",
    "Pleiades Publishing",
    "Science Publishing Group",
    "IGI Global",
    "The Economist Intelligence Unit",
    "Maney Publishing",
    "Diva Enterprises Private Limited",
    "World Scientific",
    "Mary Ann Liebert",
    "Trans Tech Publications",
];

pub const OA_PUBLISHERS: &[&str] = &[
    "Hindawi Limited",
    "OMICS Publishing Group",
    "De Gruyter Open Sp. z o.o.",
    "OpenEdition",
    "Hindawi (International Scholarly Research Network)",
    "Public Library of Science",
    "Frontiers Media SA",
    "eLife Sciences Publications, Ltd",
    "MDPI AG",
    "Dove Medical Press",
    "Open Access Text",
];

pub const SOCIETY_PUBLISHERS: &[&str] = &[
    "Institute of Electrical and Electronics Engineers",
    "Institution of Electrical Engineers",
    "Association for Computing Machinery",
    "American Psychological Association",
    "IOS Press",
    "IOP Publishing",
    "American Chemical Society",
    "Royal Society of Chemistry (RSC)",
    "American Geophysical Union",
    "American College of Physicians",
    "New England Journal of Medicine",
    "BMJ",
    "RCN Publishing",
    "International Union of Crystallography",
    "Portland Press",
    "ASME International",
];

pub const UNI_PRESS_PUBLISHERS: &[&str] = &[
    "Cambridge University Press",
    "Oxford University Press",
    "The University of Chicago Press",
    "MIT Press",
];

pub const ARCHIVE_PUBLISHERS: &[&str] = &["JSTOR", "Portico"];

pub const REPOSITORY_PUBLISHERS: &[&str] = &[
    "PERSEE Program",
    "Social Science Electronic Publishing",
    "CAIRN",
    "CSIRO Publishing",
];

pub const OTHER_PUBLISHERS: &[&str] = &[
    "African Journals Online",
    "Smithsonian Institution Biodiversity Heritage Library",
    "Canadian Science Publishing",
    "Philosophy Documentation Center",
    "Project MUSE",
];

/// Languages that keep an OA journal out of the long tail
pub const MAINSTREAM_LANGS: &[&str] = &["en", "de", "fr", "ja"];

/// Countries that keep an OA journal out of the long tail
pub const MAINSTREAM_COUNTRIES: &[&str] = &["us", "gb", "nl", "cn", "jp", "de"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherType {
    Big5,
    Oa,
    Commercial,
    Archive,
    Repository,
    Other,
    Society,
    Unipress,
    Scielo,
    Longtail,
}

impl PublisherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublisherType::Big5 => "big5",
            PublisherType::Oa => "oa",
            PublisherType::Commercial => "commercial",
            PublisherType::Archive => "archive",
            PublisherType::Repository => "repository",
            PublisherType::Other => "other",
            PublisherType::Society => "society",
            PublisherType::Unipress => "unipress",
            PublisherType::Scielo => "scielo",
            PublisherType::Longtail => "longtail",
        }
    }
}

impl fmt::Display for PublisherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the classifier needs to know about one journal
#[derive(Debug, Clone, Copy, Default)]
pub struct PublisherContext<'a> {
    pub publisher: Option<&'a str>,
    pub is_oa: bool,
    pub has_dois: bool,
    pub lang: Option<&'a str>,
    pub country: Option<&'a str>,
}

fn listed(table: &[&str], publisher: Option<&str>) -> bool {
    publisher.is_some_and(|p| table.contains(&p))
}

fn mentions(lowered: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| lowered.contains(n))
}

fn outside(value: Option<&str>, mainstream: &[&str]) -> bool {
    value.is_some_and(|v| !mainstream.contains(&v))
}

pub fn classify(ctx: &PublisherContext<'_>) -> Option<PublisherType> {
    let publisher = ctx.publisher;
    let lowered = publisher.unwrap_or_default().trim().to_lowercase();

    if listed(BIG5_PUBLISHERS, publisher)
        || mentions(&lowered, &["elsevier", "springer", "wiley"])
    {
        Some(PublisherType::Big5)
    } else if listed(OA_PUBLISHERS, publisher) {
        Some(PublisherType::Oa)
    } else if listed(COMMERCIAL_PUBLISHERS, publisher)
        || mentions(&lowered, &["wolters kluwer", "wolters-kluwer"])
    {
        Some(PublisherType::Commercial)
    } else if listed(ARCHIVE_PUBLISHERS, publisher) {
        Some(PublisherType::Archive)
    } else if listed(REPOSITORY_PUBLISHERS, publisher) {
        Some(PublisherType::Repository)
    } else if listed(OTHER_PUBLISHERS, publisher) {
        Some(PublisherType::Other)
    } else if listed(SOCIETY_PUBLISHERS, publisher)
        || mentions(&lowered, &["society", "association", "academy of ", "institute of"])
    {
        Some(PublisherType::Society)
    } else if listed(UNI_PRESS_PUBLISHERS, publisher) || lowered.contains("university ") {
        Some(PublisherType::Unipress)
    } else if lowered.contains("scielo") {
        Some(PublisherType::Scielo)
    } else if ctx.is_oa
        && (!ctx.has_dois
            || outside(ctx.lang, MAINSTREAM_LANGS)
            || outside(ctx.country, MAINSTREAM_COUNTRIES))
    {
        Some(PublisherType::Longtail)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(publisher: &str) -> PublisherContext<'_> {
        PublisherContext {
            publisher: Some(publisher),
            ..Default::default()
        }
    }

    #[test]
    fn test_big5_regardless_of_oa() {
        let mut ctx = named("Elsevier");
        assert_eq!(classify(&ctx), Some(PublisherType::Big5));
        ctx.is_oa = true;
        assert_eq!(classify(&ctx), Some(PublisherType::Big5));
        assert_eq!(classify(&named("Elsevier Science B.V.")), Some(PublisherType::Big5));
    }

    #[test]
    fn test_oa_listed_before_commercial() {
        assert_eq!(classify(&named("MDPI AG")), Some(PublisherType::Oa));
        assert_eq!(
            classify(&named("Wolters Kluwer Medknow")),
            Some(PublisherType::Commercial)
        );
    }

    #[test]
    fn test_substring_heuristics() {
        assert_eq!(
            classify(&named("Polish Mathematical Society")),
            Some(PublisherType::Society)
        );
        assert_eq!(
            classify(&named("Seoul National University Press")),
            Some(PublisherType::Unipress)
        );
        assert_eq!(classify(&named("SciELO Brasil")), Some(PublisherType::Scielo));
        assert_eq!(classify(&named("Portico")), Some(PublisherType::Archive));
    }

    #[test]
    fn test_longtail() {
        let ctx = PublisherContext {
            publisher: None,
            is_oa: true,
            has_dois: false,
            ..Default::default()
        };
        assert_eq!(classify(&ctx), Some(PublisherType::Longtail));

        let mainstream = PublisherContext {
            has_dois: true,
            lang: Some("en"),
            country: Some("us"),
            ..ctx
        };
        assert_eq!(classify(&mainstream), None);

        let foreign = PublisherContext {
            country: Some("br"),
            ..mainstream
        };
        assert_eq!(classify(&foreign), Some(PublisherType::Longtail));
    }

    #[test]
    fn test_not_oa_unclassified() {
        assert_eq!(classify(&named("Some Small Press")), None);
        assert_eq!(classify(&PublisherContext::default()), None);
    }
}
