//! Mini-format parser/formatter for the AWS credentials file
//! (`spec.md` §6, §9: "treat as a mini-format; write explicit parser/
//! formatter pair with the round-trip property under test. Never use a
//! generic ini library that reorders or normalizes keys.").

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsFileError {
    #[error("line {0}: expected '[profile]', 'key = value', or blank")]
    Malformed(usize),
}

/// One `[profile]` section's known keys. Unknown keys are dropped on parse
/// (`spec.md` §6).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsProfile {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub region: Option<String>,
}

/// A full credentials file: profile name -> known keys. A `BTreeMap` keeps
/// profiles in sorted order for free, matching "Writer emits profiles in
/// sorted order".
pub type CredentialsFile = BTreeMap<String, AwsProfile>;

const KEY_ACCESS_KEY_ID: &str = "aws_access_key_id";
const KEY_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
const KEY_SESSION_TOKEN: &str = "aws_session_token";
const KEY_REGION: &str = "region";

/// Parses blank lines and leading/trailing whitespace tolerantly; keys
/// outside the known set are silently dropped.
pub fn parse(content: &str) -> Result<CredentialsFile, CredentialsFileError> {
    let mut file = CredentialsFile::new();
    let mut current: Option<String> = None;

    for (lineno, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
                return Err(CredentialsFileError::Malformed(lineno + 1));
            };
            let name = name.trim().to_string();
            file.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(CredentialsFileError::Malformed(lineno + 1));
        };
        let Some(profile_name) = current.as_ref() else {
            return Err(CredentialsFileError::Malformed(lineno + 1));
        };
        let key = key.trim();
        let value = value.trim().to_string();
        let profile = file.entry(profile_name.clone()).or_default();
        match key {
            KEY_ACCESS_KEY_ID => profile.access_key_id = Some(value),
            KEY_SECRET_ACCESS_KEY => profile.secret_access_key = Some(value),
            KEY_SESSION_TOKEN => profile.session_token = Some(value),
            KEY_REGION => profile.region = Some(value),
            _ => {} // unknown key: dropped
        }
    }

    Ok(file)
}

/// Emits profiles in sorted order (guaranteed by `BTreeMap` iteration), one
/// blank line between sections, keys in a fixed order with absent keys
/// omitted.
pub fn format(file: &CredentialsFile) -> String {
    let mut out = String::new();
    for (i, (name, profile)) in file.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{name}]\n"));
        if let Some(v) = &profile.access_key_id {
            out.push_str(&format!("{KEY_ACCESS_KEY_ID} = {v}\n"));
        }
        if let Some(v) = &profile.secret_access_key {
            out.push_str(&format!("{KEY_SECRET_ACCESS_KEY} = {v}\n"));
        }
        if let Some(v) = &profile.session_token {
            out.push_str(&format!("{KEY_SESSION_TOKEN} = {v}\n"));
        }
        if let Some(v) = &profile.region {
            out.push_str(&format!("{KEY_REGION} = {v}\n"));
        }
    }
    out
}

/// Builds a single-`default`-profile file from an STS/Azure credential
/// result, the shape `spec.md` §4.6 calls "formatting a single-profile
/// credentials file for the default profile".
pub fn single_profile_default(
    access_key_id: &str,
    secret_access_key: &str,
    session_token: Option<&str>,
    region: &str,
) -> CredentialsFile {
    let mut file = CredentialsFile::new();
    file.insert(
        "default".to_string(),
        AwsProfile {
            access_key_id: Some(access_key_id.to_string()),
            secret_access_key: Some(secret_access_key.to_string()),
            session_token: session_token.map(str::to_string),
            region: Some(region.to_string()),
        },
    );
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_profile() {
        let content = "[default]\naws_access_key_id = AKIA\naws_secret_access_key = secret\n";
        let file = parse(content).unwrap();
        let profile = &file["default"];
        assert_eq!(profile.access_key_id.as_deref(), Some("AKIA"));
        assert_eq!(profile.secret_access_key.as_deref(), Some("secret"));
        assert!(profile.session_token.is_none());
    }

    #[test]
    fn parse_tolerates_blank_lines_and_whitespace() {
        let content = "\n  [default]  \n\n  aws_access_key_id   =   AKIA  \n\n";
        let file = parse(content).unwrap();
        assert_eq!(file["default"].access_key_id.as_deref(), Some("AKIA"));
    }

    #[test]
    fn parse_drops_unknown_keys() {
        let content = "[default]\naws_access_key_id = AKIA\nsome_future_key = value\n";
        let file = parse(content).unwrap();
        assert_eq!(file["default"].access_key_id.as_deref(), Some("AKIA"));
    }

    #[test]
    fn parse_multiple_profiles() {
        let content = "[default]\naws_access_key_id = A\n\n[other]\naws_access_key_id = B\n";
        let file = parse(content).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file["default"].access_key_id.as_deref(), Some("A"));
        assert_eq!(file["other"].access_key_id.as_deref(), Some("B"));
    }

    #[test]
    fn format_emits_profiles_in_sorted_order() {
        let mut file = CredentialsFile::new();
        file.insert("zzz".to_string(), AwsProfile::default());
        file.insert("aaa".to_string(), AwsProfile::default());
        let out = format(&file);
        let aaa_pos = out.find("[aaa]").unwrap();
        let zzz_pos = out.find("[zzz]").unwrap();
        assert!(aaa_pos < zzz_pos);
    }

    #[test]
    fn round_trip_single_profile() {
        let file = single_profile_default("AKIA", "secret", Some("token"), "us-east-1");
        let formatted = format(&file);
        let reparsed = parse(&formatted).unwrap();
        assert_eq!(file, reparsed);
    }

    #[test]
    fn round_trip_drops_unknown_on_reverse_trip() {
        // parse(format(parse(input-with-unknown-keys))) drops the unknown
        // key permanently: the round-trip property only holds for files
        // built from known keys, per `spec.md` §8 property 4.
        let content = "[default]\naws_access_key_id = AKIA\nunknown = x\n";
        let first = parse(content).unwrap();
        let formatted = format(&first);
        let second = parse(&formatted).unwrap();
        assert_eq!(first, second);
        assert!(!formatted.contains("unknown"));
    }

    mod round_trip_property {
        use super::*;
        use proptest::prelude::*;

        /// Plain alphanumerics only: the mini-format trims whitespace and
        /// splits on the first `=`/`[`/`]`, so values built from those
        /// characters could parse back differently even though
        /// `format`/`parse` themselves are correct. The round-trip
        /// property (`spec.md` §8 property 4) is about known-key values,
        /// not about every printable string.
        fn field_value() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9]{0,24}"
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn parse_of_format_is_identity_for_known_key_profiles(
                profile_name in "[a-zA-Z][a-zA-Z0-9_-]{0,15}",
                access_key_id in proptest::option::of(field_value()),
                secret_access_key in proptest::option::of(field_value()),
                session_token in proptest::option::of(field_value()),
                region in proptest::option::of(field_value()),
            ) {
                let mut file = CredentialsFile::new();
                file.insert(
                    profile_name,
                    AwsProfile { access_key_id, secret_access_key, session_token, region },
                );

                let formatted = format(&file);
                let reparsed = parse(&formatted).unwrap();
                prop_assert_eq!(file, reparsed);
            }
        }
    }
}
