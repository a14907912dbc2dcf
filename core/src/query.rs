//! Query-string serialization.
//!
//! Mutating the query re-serializes every existing pair with
//! `application/x-www-form-urlencoded` rules, the same way a browser's
//! `URLSearchParams` does.

use url::Url;

use crate::types::{Delimiter, ParamValue};

/// Apply `params` to `url` in order.
///
/// `Duplicate` appends one pair per value. `Comma` behaves like a
/// `set`: the first existing pair for the key takes the joined value and any
/// later ones are dropped, otherwise a new pair is appended.
pub fn apply_params(url: &mut Url, params: &[(String, ParamValue)], delimiter: Delimiter) {
    if params.is_empty() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut touched = false;

    for (key, value) in params {
        let values = value.values();
        match delimiter {
            Delimiter::Comma => {
                set_pair(&mut pairs, key, values.join(","));
                touched = true;
            }
            Delimiter::Duplicate => {
                touched |= !values.is_empty();
                pairs.extend(values.into_iter().map(|v| (key.clone(), v.to_string())));
            }
        }
    }

    // Only re-serialize when a pair changed; the existing query keeps its
    // original encoding otherwise.
    if touched {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, joined: String) {
    let mut seen = false;
    pairs.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        v.clone_from(&joined);
        true
    });
    if !seen {
        pairs.push((key.to_string(), joined));
    }
}
