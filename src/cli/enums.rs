//! CLI enum types for generation options.

use clap::ValueEnum;

use crate::generator::Resolution;

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResolutionArg {
    #[default]
    #[value(name = "720p")]
    Hd720,
    #[value(name = "1080p")]
    FullHd1080,
    #[value(name = "4k")]
    Uhd4k,
}

impl From<ResolutionArg> for Resolution {
    fn from(r: ResolutionArg) -> Self {
        match r {
            ResolutionArg::Hd720 => Resolution::Hd720,
            ResolutionArg::FullHd1080 => Resolution::FullHd1080,
            ResolutionArg::Uhd4k => Resolution::Uhd4k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_arg_names_match_labels() {
        for arg in ResolutionArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(Resolution::from(*arg).label(), name);
        }
    }
}
