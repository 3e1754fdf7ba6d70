//! Signature decipher (C6): fetch the player script, recognise its
//! signature-transforming helper object, derive a token program, and apply
//! it to an encrypted signature.
//!
//! The four primitive shapes and the overall pattern are a direct port of
//! the four named regexes the spec calls out in §9 ("Regex-driven
//! JavaScript parsing"); together they form a `DecipherProgramExtractor`
//! whose only public surface is [`Cipher::program`].

use crate::client::HttpClient;
use crate::error::RytError;
use moka::future::Cache;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One step of a derived decipher program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Reverse the whole array.
    Reverse,
    /// Drop the first `n` elements (`slice` shape).
    Slice(usize),
    /// Drop the first `n` elements (`splice` shape -- same semantics as
    /// `Slice`, kept distinct so a caller can tell which JS shape matched).
    Splice(usize),
    /// Swap index 0 with index `n % len`.
    Swap(usize),
}

/// An ordered decipher program, applied left to right.
pub type Program = Vec<Token>;

fn jsvar() -> &'static str {
    r"[a-zA-Z_$][a-zA-Z_0-9]*"
}

fn actions_obj_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let v = jsvar();
        let reverse = r":function\(a\)\{(?:return )?a\.reverse\(\)\}";
        let slice = r":function\(a,b\)\{return a\.slice\(b\)\}";
        let splice = r":function\(a,b\)\{a\.splice\(0,b\)\}";
        let swap =
            r"var c=a\[0\];a\[0\]=a\[b(?:%a\.length)?\];a\[b(?:%a\.length)?\]=c(?:;return a)?\}";
        let swap_full = format!(r":function\(a,b\)\{{{swap}");
        Regex::new(&format!(
            r"var ({v})=\{{((?:(?:{v}{reverse}|{v}{slice}|{v}{splice}|{v}{swap_full}),?\n?)+)\}};"
        ))
        .unwrap()
    })
}

fn actions_func_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let v = jsvar();
        Regex::new(&format!(
            r#"function(?: {v})?\(a\)\{{a=a\.split\(""\);\s*((?:(?:a=)?{v}\.{v}\(a,\d+\);)+)return a\.join\(""\)\}}"#
        ))
        .unwrap()
    })
}

fn key_re(shape: &str) -> Regex {
    let v = jsvar();
    Regex::new(&format!(r"(?m)(?:^|,)({v}){shape}")).unwrap()
}

/// Recognise one primitive's function body and return its key -> primitive
/// lookup, plus the ordered call sequence parsed out of the transform
/// function's body.
fn program_from_js(js: &str) -> Result<Program, RytError> {
    let obj_caps = actions_obj_re()
        .captures(js)
        .ok_or_else(|| RytError::Signature("no transform-helper object found".to_string()))?;
    let func_caps = actions_func_re()
        .captures(js)
        .ok_or_else(|| RytError::Signature("no transform function found".to_string()))?;

    let obj = &obj_caps[1];
    let obj_body = &obj_caps[2];
    let func_body = &func_caps[1];

    let reverse_shape = r":function\(a\)\{(?:return )?a\.reverse\(\)\}";
    let slice_shape = r":function\(a,b\)\{return a\.slice\(b\)\}";
    let splice_shape = r":function\(a,b\)\{a\.splice\(0,b\)\}";
    let swap_shape =
        r":function\(a,b\)\{var c=a\[0\];a\[0\]=a\[b(?:%a\.length)?\];a\[b(?:%a\.length)?\]=c(?:;return a)?\}";

    let reverse_key = key_re(reverse_shape).captures(obj_body).map(|c| c[1].to_string());
    let slice_key = key_re(slice_shape).captures(obj_body).map(|c| c[1].to_string());
    let splice_key = key_re(splice_shape).captures(obj_body).map(|c| c[1].to_string());
    let swap_key = key_re(swap_shape).captures(obj_body).map(|c| c[1].to_string());

    if [&reverse_key, &slice_key, &splice_key, &swap_key]
        .iter()
        .all(|k| k.is_none())
    {
        return Err(RytError::Signature(
            "transform-helper object had no recognised primitives".to_string(),
        ));
    }

    let escaped_obj = regex::escape(obj);
    let keys: Vec<&str> = [&reverse_key, &slice_key, &splice_key, &swap_key]
        .iter()
        .filter_map(|k| k.as_deref())
        .collect();
    let call_re = Regex::new(&format!(
        r"(?:a=)?{escaped_obj}\.({})\(a,(\d+)\)",
        keys.join("|")
    ))?;

    let mut program = Vec::new();
    for caps in call_re.captures_iter(func_body) {
        let key = &caps[1];
        let n: usize = caps[2].parse().unwrap_or(0);
        let token = if Some(key) == reverse_key.as_deref() {
            Token::Reverse
        } else if Some(key) == slice_key.as_deref() {
            Token::Slice(n)
        } else if Some(key) == splice_key.as_deref() {
            Token::Splice(n)
        } else if Some(key) == swap_key.as_deref() {
            Token::Swap(n)
        } else {
            continue;
        };
        program.push(token);
    }

    if program.is_empty() {
        return Err(RytError::Signature(
            "transform function referenced no recognised primitive calls".to_string(),
        ));
    }
    Ok(program)
}

/// Execute a derived program against a signature string.
pub fn execute(program: &Program, sig: &str) -> String {
    let mut chars: Vec<char> = sig.chars().collect();
    for token in program {
        match *token {
            Token::Reverse => chars.reverse(),
            Token::Slice(n) | Token::Splice(n) => {
                let n = n.min(chars.len());
                chars.drain(0..n);
            }
            Token::Swap(n) => {
                if !chars.is_empty() {
                    let i = n % chars.len();
                    chars.swap(0, i);
                }
            }
        }
    }
    chars.into_iter().collect()
}

/// Fetches player scripts and caches their derived [`Program`] per URL so a
/// token program is only derived once per player script within a process.
#[derive(Clone)]
pub struct Cipher {
    http: HttpClient,
    programs: Arc<Cache<String, Program>>,
}

impl Cipher {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            programs: Arc::new(
                Cache::builder()
                    .time_to_live(Duration::from_secs(3600))
                    .build(),
            ),
        }
    }

    /// Resolve (fetching + caching as needed) the decipher program for a
    /// player script URL.
    pub async fn program_for(
        &self,
        player_script_url: &str,
        youtube_base: &str,
        cancel: &CancellationToken,
    ) -> Result<Program, RytError> {
        if let Some(cached) = self.programs.get(player_script_url).await {
            return Ok(cached);
        }

        let resolved = resolve_url(youtube_base, player_script_url)?;
        let js = self.http.get_and_read_text(&resolved, cancel).await?;
        let program = program_from_js(&js).inspect_err(|err| {
            tracing::warn!(player_script_url, %err, "no decipher program found in player script");
        })?;
        self.programs
            .insert(player_script_url.to_string(), program.clone())
            .await;
        Ok(program)
    }

    /// Decipher `sig` using the program for `player_script_url`.
    pub async fn decipher(
        &self,
        sig: &str,
        player_script_url: &str,
        youtube_base: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RytError> {
        let program = self
            .program_for(player_script_url, youtube_base, cancel)
            .await?;
        Ok(execute(&program, sig))
    }
}

fn resolve_url(base: &str, maybe_relative: &str) -> Result<String, RytError> {
    let base = url::Url::parse(base)?;
    let resolved = base.join(maybe_relative)?;
    Ok(resolved.to_string())
}
