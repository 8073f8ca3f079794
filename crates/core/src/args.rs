//! `key=value` launch arguments and the options derived from them.

use std::{collections::BTreeMap, ffi::OsString, path::PathBuf};

use tracing::debug;

use crate::{
    config::AppConfig,
    error::ArgumentError,
    models::{AssetSelection, EditionTag},
};

/// Flat option map built once from the command line.
pub type ConfigurationMap = BTreeMap<String, String>;

const KNOWN_KEYS: [&str; 7] = ["renderer", "mode", "xres", "yres", "car", "track", "resources"];

/// Parse `key=value` tokens into a map. Later duplicates overwrite earlier ones.
pub fn parse_args<I, S>(tokens: I) -> Result<ConfigurationMap, ArgumentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parameters = ConfigurationMap::new();
    extend_args(&mut parameters, tokens)?;
    Ok(parameters)
}

/// Parse raw process arguments, rejecting any token that is not valid UTF-8.
pub fn parse_args_os<I>(tokens: I) -> Result<ConfigurationMap, ArgumentError>
where
    I: IntoIterator<Item = OsString>,
{
    let tokens = tokens
        .into_iter()
        .map(|token| {
            token.into_string().map_err(|raw| {
                ArgumentError::NonUnicodeArgument(raw.to_string_lossy().into_owned())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    parse_args(tokens)
}

/// Apply tokens to an existing map, stopping at the first malformed one.
///
/// Tokens before the failing one stay applied.
pub fn extend_args<I, S>(parameters: &mut ConfigurationMap, tokens: I) -> Result<(), ArgumentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for token in tokens {
        let (key, value) = split_token(token.as_ref())?;
        parameters.insert(key.to_string(), value.to_string());
    }
    Ok(())
}

fn split_token(token: &str) -> Result<(&str, &str), ArgumentError> {
    let (key, value) = token
        .split_once('=')
        .ok_or_else(|| ArgumentError::MalformedArgument {
            token: token.to_string(),
            reason: "missing '='",
        })?;
    if key.is_empty() {
        return Err(ArgumentError::MalformedArgument {
            token: token.to_string(),
            reason: "missing key before '='",
        });
    }
    Ok((key, value))
}

/// Which top-level flow the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Load, render, reselect until the operator quits.
    Interactive,
    /// One load-and-train cycle with the training selection.
    Training,
}

/// Resolved launch settings: config defaults overlaid with command-line values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Selected flow.
    pub mode: RunMode,
    /// Display width.
    pub xres: u32,
    /// Display height.
    pub yres: u32,
    /// Resource root to scan.
    pub resource_root: PathBuf,
    /// First selection of the interactive loop.
    pub seed: AssetSelection,
    /// Fixed selection for training mode.
    pub training: AssetSelection,
}

impl LaunchOptions {
    /// Resolve options, letting `parameters` override `config`.
    pub fn resolve(parameters: &ConfigurationMap, config: &AppConfig) -> Result<Self, ArgumentError> {
        if let Some(renderer) = parameters.get("renderer") {
            if matches!(renderer.as_str(), "vulkan" | "vk") {
                return Err(ArgumentError::UnsupportedRenderer("Vulkan".to_string()));
            }
        }

        for key in parameters.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!("ignoring unrecognised option '{key}'");
            }
        }

        let mode = match parameters.get("mode").map(String::as_str) {
            Some("train") => RunMode::Training,
            _ => RunMode::Interactive,
        };

        let edition = parse_edition("default_edition", &config.default_edition)?;
        let seed = AssetSelection::new(
            edition,
            parameters
                .get("track")
                .cloned()
                .unwrap_or_else(|| config.default_track.clone()),
            parameters
                .get("car")
                .cloned()
                .unwrap_or_else(|| config.default_car.clone()),
        );
        let training = AssetSelection::new(
            edition,
            config.training_track.clone(),
            config.training_car.clone(),
        );

        Ok(Self {
            mode,
            xres: resolution(parameters, "xres", config.xres)?,
            yres: resolution(parameters, "yres", config.yres)?,
            resource_root: parameters
                .get("resources")
                .map(PathBuf::from)
                .unwrap_or_else(|| config.resource_root.clone()),
            seed,
            training,
        })
    }
}

fn parse_edition(key: &str, value: &str) -> Result<EditionTag, ArgumentError> {
    match value.parse::<EditionTag>() {
        Ok(tag) if !tag.is_unknown() => Ok(tag),
        Ok(_) => Err(ArgumentError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "the sentinel edition cannot be selected".to_string(),
        }),
        Err(reason) => Err(ArgumentError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        }),
    }
}

fn resolution(
    parameters: &ConfigurationMap,
    key: &str,
    default: u32,
) -> Result<u32, ArgumentError> {
    let Some(raw) = parameters.get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err(ArgumentError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: "must be greater than zero".to_string(),
        }),
        Err(err) => Err(ArgumentError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keys_each_get_an_entry() {
        let parsed = parse_args(["xres=1280", "yres=720", "track=trk002"]).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["xres"], "1280");
        assert_eq!(parsed["track"], "trk002");
    }

    #[test]
    fn later_duplicates_win() {
        let parsed = parse_args(["car=diab", "track=trk001", "car=f355"]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["car"], "f355");
    }

    #[test]
    fn value_may_be_empty_or_contain_equals() {
        let parsed = parse_args(["mode=", "track=a=b"]).unwrap();
        assert_eq!(parsed["mode"], "");
        assert_eq!(parsed["track"], "a=b");
    }

    #[test]
    fn rejects_missing_delimiter_and_empty_key() {
        assert!(matches!(
            parse_args(["fullscreen"]),
            Err(ArgumentError::MalformedArgument { reason: "missing '='", .. })
        ));
        assert!(matches!(
            parse_args(["=1920"]),
            Err(ArgumentError::MalformedArgument { .. })
        ));
    }

    #[test]
    fn os_arguments_parse_like_strings() {
        let parsed = parse_args_os([OsString::from("xres=800"), OsString::from("car=diab")]).unwrap();
        assert_eq!(parsed["xres"], "800");
        assert_eq!(parsed["car"], "diab");
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_argument_is_an_error() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"track=\xfftrk".to_vec());
        assert!(matches!(
            parse_args_os([OsString::from("xres=800"), raw]),
            Err(ArgumentError::NonUnicodeArgument(token)) if token.starts_with("track=")
        ));
    }

    #[test]
    fn earlier_tokens_stay_applied_after_failure() {
        let mut parameters = ConfigurationMap::new();
        let result = extend_args(&mut parameters, ["xres=800", "broken", "yres=600"]);
        assert!(result.is_err());
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters["xres"], "800");
    }

    #[test]
    fn resolves_defaults_from_config() {
        let options = LaunchOptions::resolve(&ConfigurationMap::new(), &AppConfig::default()).unwrap();
        assert_eq!(options.mode, RunMode::Interactive);
        assert_eq!((options.xres, options.yres), (1920, 1080));
        assert_eq!(options.seed, AssetSelection::new(EditionTag::Nfs3, "trk001", "diab"));
        assert_eq!(options.training, AssetSelection::new(EditionTag::Nfs3, "trk008", "diab"));
    }

    #[test]
    fn command_line_overrides_config() {
        let parameters =
            parse_args(["mode=train", "xres=800", "car=f355", "resources=/games/nfs"]).unwrap();
        let options = LaunchOptions::resolve(&parameters, &AppConfig::default()).unwrap();
        assert_eq!(options.mode, RunMode::Training);
        assert_eq!(options.xres, 800);
        assert_eq!(options.seed.car, "f355");
        assert_eq!(options.resource_root, PathBuf::from("/games/nfs"));
    }

    #[test]
    fn rejects_vulkan_and_bad_resolution() {
        let vulkan = parse_args(["renderer=vk"]).unwrap();
        assert!(matches!(
            LaunchOptions::resolve(&vulkan, &AppConfig::default()),
            Err(ArgumentError::UnsupportedRenderer(_))
        ));

        let bad = parse_args(["yres=tall"]).unwrap();
        assert!(matches!(
            LaunchOptions::resolve(&bad, &AppConfig::default()),
            Err(ArgumentError::InvalidValue { .. })
        ));
    }
}
