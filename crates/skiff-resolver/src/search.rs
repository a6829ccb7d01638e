//! Search-domain expansion.

use super::Result;
use skiff_proto::Name;

/// Returns the absolute names to try, in order, for a host name.
///
/// An absolute host (trailing dot) is tried as-is. A relative host with at
/// least `ndots` dots is tried bare first and then under each search
/// domain; one with fewer dots is tried under the search domains first and
/// bare last.
pub fn candidates(host: &str, ndots: u8, search: &[Name]) -> Result<Vec<Name>> {
    let name = Name::parse(host, None)?;
    if name.is_absolute() {
        return Ok(vec![name]);
    }

    let bare = name.to_absolute()?;
    let dots = name.label_count().saturating_sub(1);

    let mut expanded = Vec::with_capacity(search.len());
    for domain in search {
        // An over-long expansion just isn't a candidate.
        if let Ok(candidate) = name.concatenate(domain) {
            expanded.push(candidate);
        }
    }

    let mut out = Vec::with_capacity(expanded.len() + 1);
    if dots >= usize::from(ndots) {
        out.push(bare);
        out.extend(expanded);
    } else {
        out.extend(expanded);
        out.push(bare);
    }

    let mut seen = Vec::with_capacity(out.len());
    out.retain(|candidate| {
        if seen.contains(candidate) {
            false
        } else {
            seen.push(candidate.clone());
            true
        }
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[Name]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn search() -> Vec<Name> {
        vec!["example.com.".parse().unwrap(), "corp.example.".parse().unwrap()]
    }

    #[test]
    fn test_absolute_host() {
        let out = candidates("www.example.com.", 1, &search()).unwrap();
        assert_eq!(names(&out), ["www.example.com."]);
    }

    #[test]
    fn test_enough_dots_tries_bare_first() {
        let out = candidates("www.example.com", 1, &search()).unwrap();
        assert_eq!(
            names(&out),
            [
                "www.example.com.",
                "www.example.com.example.com.",
                "www.example.com.corp.example.",
            ]
        );
    }

    #[test]
    fn test_few_dots_tries_search_first() {
        let out = candidates("db", 1, &search()).unwrap();
        assert_eq!(names(&out), ["db.example.com.", "db.corp.example.", "db."]);

        let out = candidates("www.example", 3, &search()).unwrap();
        assert_eq!(out.last().unwrap().to_string(), "www.example.");
    }

    #[test]
    fn test_no_search_domains() {
        let out = candidates("host", 1, &[]).unwrap();
        assert_eq!(names(&out), ["host."]);
    }

    #[test]
    fn test_duplicates_removed() {
        let out = candidates("host", 1, &[Name::root()]).unwrap();
        assert_eq!(names(&out), ["host."]);
    }

    #[test]
    fn test_bad_host() {
        assert!(candidates("", 1, &[]).is_err());
        assert!(candidates("a..b", 1, &[]).is_err());
    }
}
