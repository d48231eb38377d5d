use std::ffi::{OsStr, OsString};

use clap::{Arg, Command};

/// Two-letter single-dash flags `manage-site` has always accepted.
const LEGACY_FLAGS: &[(&str, &str)] = &[("-lc", "--list-clusters"), ("-cr", "--create-cluster")];

const MANAGE_SITE: &str = "manage-site";
const CREATE_SERVICE: &str = "create-service";

/// Rewrite legacy `manage-site` flags to their long forms before clap sees
/// them; clap would otherwise read `-lc` as `-l -c`.
///
/// Only tokens after the `manage-site` subcommand and before `--` are touched.
pub fn expand_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut in_manage_site = false;
    let mut past_separator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if !in_manage_site {
                in_manage_site = arg == MANAGE_SITE;
                return arg;
            }
            if past_separator {
                return arg;
            }
            if arg == "--" {
                past_separator = true;
                return arg;
            }
            LEGACY_FLAGS
                .iter()
                .find(|(legacy, _)| arg == *legacy)
                .map(|(_, long)| OsString::from(*long))
                .unwrap_or(arg)
        })
        .collect()
}

/// Move every `create-service` token that is not a known flag, or the value
/// of one, behind a `--` so clap reads it as a file. Unknown options such as
/// `--bogus` then fail file verification instead of argument parsing, and
/// flags may still follow the files.
pub fn gather_create_service_files(args: Vec<OsString>, root: &Command) -> Vec<OsString> {
    let Some(start) = args.iter().position(|a| a == CREATE_SERVICE) else {
        return args;
    };
    let Some(command) = root.find_subcommand(CREATE_SERVICE) else {
        return args;
    };

    let mut rest = args.iter().skip(start + 1).cloned();
    let mut gathered: Vec<OsString> = args[..=start].to_vec();
    let mut files = Vec::new();
    while let Some(arg) = rest.next() {
        if arg == "--" {
            files.extend(rest.by_ref());
            break;
        }
        match flag_arity(root, command, &arg) {
            Some(takes_next) => {
                gathered.push(arg);
                if takes_next {
                    gathered.extend(rest.next());
                }
            }
            None => files.push(arg),
        }
    }
    if !files.is_empty() {
        gathered.push(OsString::from("--"));
        gathered.extend(files);
    }
    gathered
}

/// `None` when `arg` is not a flag of `command` (or a global of `root`);
/// otherwise whether the flag's value is the next token.
fn flag_arity(root: &Command, command: &Command, arg: &OsStr) -> Option<bool> {
    let arg = arg.to_str()?;
    let mut known = command.get_arguments().chain(root.get_arguments());
    if let Some(long) = arg.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        if name.is_empty() {
            return None;
        }
        let flag = known.find(|a| a.get_long() == Some(name))?;
        return Some(takes_value(flag) && !inline);
    }
    let mut chars = arg.strip_prefix('-')?.chars();
    let short = chars.next()?;
    let flag = known.find(|a| a.get_short() == Some(short))?;
    if takes_value(flag) {
        Some(chars.as_str().is_empty())
    } else if chars.as_str().is_empty() {
        Some(false)
    } else {
        None
    }
}

fn takes_value(arg: &Arg) -> bool {
    !arg.is_positional() && arg.get_action().takes_values()
}
