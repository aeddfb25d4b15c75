//! HTTP `Range` header interpretation for single byte ranges.

/// How to answer a request given its `Range` header and the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: send the whole file.
    Full,
    /// Send the inclusive byte range `start..=end`.
    Partial { start: u64, end: u64 },
    /// Well-formed range that lies outside the file.
    Unsatisfiable,
}

impl RangeRequest {
    /// Interpret an optional `Range` header value.
    ///
    /// Supports formats:
    /// - bytes=0-499
    /// - bytes=500- (to the end)
    /// - bytes=-500 (last 500 bytes)
    ///
    /// An `end` past the file is clamped. Headers that cannot be parsed,
    /// including multi-range requests, are ignored and yield [`RangeRequest::Full`].
    pub fn parse(header: Option<&str>, file_size: u64) -> Self {
        let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };

        let Some((start, end)) = ranges.split_once('-') else {
            return Self::Full;
        };
        let (start, end) = (start.trim(), end.trim());

        if end.contains(['-', ',']) {
            return Self::Full;
        }

        match (start.is_empty(), end.is_empty()) {
            (true, false) => {
                let Ok(suffix_len) = end.parse::<u64>() else {
                    return Self::Full;
                };
                if suffix_len == 0 || file_size == 0 {
                    return Self::Unsatisfiable;
                }
                Self::Partial {
                    start: file_size.saturating_sub(suffix_len),
                    end: file_size - 1,
                }
            }
            (false, true) => {
                let Ok(start) = start.parse::<u64>() else {
                    return Self::Full;
                };
                if start >= file_size {
                    return Self::Unsatisfiable;
                }
                Self::Partial {
                    start,
                    end: file_size - 1,
                }
            }
            (false, false) => {
                let (Ok(start), Ok(end)) = (start.parse::<u64>(), end.parse::<u64>()) else {
                    return Self::Full;
                };
                if start >= file_size || start > end {
                    return Self::Unsatisfiable;
                }
                Self::Partial {
                    start,
                    end: end.min(file_size - 1),
                }
            }
            (true, true) => Self::Full,
        }
    }
}
