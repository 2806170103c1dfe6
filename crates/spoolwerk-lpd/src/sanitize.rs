// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Peer-supplied names are untrusted.

/// Keep only ASCII letters, digits, `-` and `_`, in their original order.
///
/// Applied to every queue and file name received from the peer before it
/// touches a path, so `/`, `.` and control bytes can never reach the
/// filesystem.  An empty result is the caller's to reject.
pub fn sanitize(raw: &[u8]) -> String {
    raw.iter()
        .copied()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    }

    fn is_subsequence(needle: &[u8], haystack: &[u8]) -> bool {
        let mut it = haystack.iter();
        needle.iter().all(|n| it.any(|h| h == n))
    }

    #[test]
    fn keeps_conventional_job_names() {
        assert_eq!(sanitize(b"cfA001host"), "cfA001host");
        assert_eq!(sanitize(b"dfA001my-host_2"), "dfA001my-host_2");
    }

    #[test]
    fn strips_path_traversal() {
        assert_eq!(sanitize(b"../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize(b"/dev/lp0"), "devlp0");
        assert_eq!(sanitize(b"lp\0\r\n"), "lp");
    }

    #[test]
    fn everything_unsafe_yields_empty() {
        assert_eq!(sanitize(b""), "");
        assert_eq!(sanitize(b"../.. /"), "");
        assert_eq!(sanitize("é€".as_bytes()), "");
    }

    #[test]
    fn output_is_filtered_subsequence_and_idempotent() {
        let inputs: [&[u8]; 6] = [
            b"queue name with spaces",
            b"a/b\\c.d:e;f",
            b"\x01\x02lp\x7f\xff",
            b"--__--",
            "naïve-print".as_bytes(),
            b"cfA123host.example.org",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert!(once.chars().all(is_allowed), "{once:?}");
            assert!(is_subsequence(once.as_bytes(), input));
            assert_eq!(sanitize(once.as_bytes()), once);
        }
    }
}
