use std::fmt;

/// Inclusive `(lower, upper)` range the engine accepts for a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub lower: i32,
    pub upper: i32,
}

impl Bounds {
    #[must_use]
    pub fn contains(self, value: i32) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

impl From<Bounds> for (i32, i32) {
    fn from(b: Bounds) -> Self {
        (b.lower, b.upper)
    }
}

/// Advanced compression parameters, keyed by the engine's numeric ids.
///
/// ```text
/// ┌─────┬────────────────────────────┐     ┌─────┬──────────────────┐
/// │ id  │ name                       │     │ id  │ name             │
/// ├─────┼────────────────────────────┤     ├─────┼──────────────────┤
/// │ 100 │ compressionLevel           │     │ 160 │ enableLongDist…  │
/// │ 101 │ windowLog                  │     │ 161 │ ldmHashLog       │
/// │ 102 │ hashLog                    │     │ 162 │ ldmMinMatch      │
/// │ 103 │ chainLog                   │     │ 163 │ ldmBucketSizeLog │
/// │ 104 │ searchLog                  │     │ 164 │ ldmHashRateLog   │
/// │ 105 │ minMatch                   │     │ 200 │ contentSizeFlag  │
/// │ 106 │ targetLength               │     │ 201 │ checksumFlag     │
/// │ 107 │ strategy                   │     │ 202 │ dictIDFlag       │
/// └─────┴────────────────────────────┘     └─────┴──────────────────┘
/// ```
///
/// The ids are stable across engine releases, so raw `(id, value)` option
/// lists written by other tools map onto this table unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompressParameter {
    CompressionLevel,
    WindowLog,
    HashLog,
    ChainLog,
    SearchLog,
    MinMatch,
    TargetLength,
    Strategy,
    EnableLongDistanceMatching,
    LdmHashLog,
    LdmMinMatch,
    LdmBucketSizeLog,
    LdmHashRateLog,
    ContentSizeFlag,
    ChecksumFlag,
    DictIdFlag,
}

impl CompressParameter {
    pub const ALL: [Self; 16] = [
        Self::CompressionLevel,
        Self::WindowLog,
        Self::HashLog,
        Self::ChainLog,
        Self::SearchLog,
        Self::MinMatch,
        Self::TargetLength,
        Self::Strategy,
        Self::EnableLongDistanceMatching,
        Self::LdmHashLog,
        Self::LdmMinMatch,
        Self::LdmBucketSizeLog,
        Self::LdmHashRateLog,
        Self::ContentSizeFlag,
        Self::ChecksumFlag,
        Self::DictIdFlag,
    ];

    #[must_use]
    pub fn id(self) -> i32 {
        match self {
            Self::CompressionLevel => 100,
            Self::WindowLog => 101,
            Self::HashLog => 102,
            Self::ChainLog => 103,
            Self::SearchLog => 104,
            Self::MinMatch => 105,
            Self::TargetLength => 106,
            Self::Strategy => 107,
            Self::EnableLongDistanceMatching => 160,
            Self::LdmHashLog => 161,
            Self::LdmMinMatch => 162,
            Self::LdmBucketSizeLog => 163,
            Self::LdmHashRateLog => 164,
            Self::ContentSizeFlag => 200,
            Self::ChecksumFlag => 201,
            Self::DictIdFlag => 202,
        }
    }

    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CompressionLevel => "compressionLevel",
            Self::WindowLog => "windowLog",
            Self::HashLog => "hashLog",
            Self::ChainLog => "chainLog",
            Self::SearchLog => "searchLog",
            Self::MinMatch => "minMatch",
            Self::TargetLength => "targetLength",
            Self::Strategy => "strategy",
            Self::EnableLongDistanceMatching => "enableLongDistanceMatching",
            Self::LdmHashLog => "ldmHashLog",
            Self::LdmMinMatch => "ldmMinMatch",
            Self::LdmBucketSizeLog => "ldmBucketSizeLog",
            Self::LdmHashRateLog => "ldmHashRateLog",
            Self::ContentSizeFlag => "contentSizeFlag",
            Self::ChecksumFlag => "checksumFlag",
            Self::DictIdFlag => "dictIDFlag",
        }
    }

    /// Look a parameter up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CompressParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Advanced decompression parameters. Only the window size limit is
/// exposed; it bounds the memory a hostile frame can make the decoder
/// reserve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecompressParameter {
    WindowLogMax,
}

impl DecompressParameter {
    pub const ALL: [Self; 1] = [Self::WindowLogMax];

    #[must_use]
    pub fn id(self) -> i32 {
        match self {
            Self::WindowLogMax => 100,
        }
    }

    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::WindowLogMax => "windowLogMax",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for DecompressParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Match-finding strategies, from fastest to strongest. The discriminant
/// is the value to pass for [`CompressParameter::Strategy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Fast = 1,
    DFast = 2,
    Greedy = 3,
    Lazy = 4,
    Lazy2 = 5,
    BtLazy2 = 6,
    BtOpt = 7,
    BtUltra = 8,
    BtUltra2 = 9,
}

impl Strategy {
    pub const ALL: [Self; 9] = [
        Self::Fast,
        Self::DFast,
        Self::Greedy,
        Self::Lazy,
        Self::Lazy2,
        Self::BtLazy2,
        Self::BtOpt,
        Self::BtUltra,
        Self::BtUltra2,
    ];

    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| *s as i32 == id)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::DFast => "dfast",
            Self::Greedy => "greedy",
            Self::Lazy => "lazy",
            Self::Lazy2 => "lazy2",
            Self::BtLazy2 => "btlazy2",
            Self::BtOpt => "btopt",
            Self::BtUltra => "btultra",
            Self::BtUltra2 => "btultra2",
        }
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}
