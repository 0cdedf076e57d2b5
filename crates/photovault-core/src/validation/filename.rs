//! File name normalization for client-supplied names and path segments.

const MAX_FILENAME_BYTES: usize = 255;

/// Characters that are never allowed in a stored name.
const ILLEGAL_CHARS: &[char] = &['/', '?', '<', '>', '\\', ':', '*', '|', '"'];

/// Device names Windows reserves regardless of extension.
const WINDOWS_RESERVED: &[&str] = &[
    "con", "prn", "aux", "nul", "com0", "com1", "com2", "com3", "com4", "com5", "com6", "com7",
    "com8", "com9", "lpt0", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8",
    "lpt9",
];

/// Extension of the last path component, including the leading dot.
///
/// Returns an empty string when there is no extension or the only dot is the
/// first character (`.bashrc`).
pub fn extname(name: &str) -> &str {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[idx..],
        _ => "",
    }
}

fn is_control(c: char) -> bool {
    let code = c as u32;
    code < 0x20 || (0x7f..=0x9f).contains(&code)
}

fn is_windows_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).to_lowercase();
    WINDOWS_RESERVED.contains(&stem.as_str())
}

fn truncate_to_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Make `input` safe to use as a single file name.
///
/// Removes path separators, reserved punctuation and control characters, drops
/// names made only of dots and Windows device names, trims trailing dots and
/// spaces, and caps the result at 255 bytes. The result may be empty.
pub fn sanitize_filename(input: &str) -> String {
    let mut sanitized: String = input
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !is_control(*c))
        .collect();

    if sanitized.chars().all(|c| c == '.') || is_windows_reserved(&sanitized) {
        return String::new();
    }

    let trimmed_len = sanitized.trim_end_matches(&['.', ' '][..]).len();
    sanitized.truncate(trimmed_len);
    truncate_to_bytes(&mut sanitized, MAX_FILENAME_BYTES);
    sanitized
}

/// Sanitize a client-supplied directory component.
///
/// Same rules as [`sanitize_filename`], and leading dots are removed as well so
/// that `../../etc` becomes `etc`. Returns `None` when nothing usable is left.
pub fn sanitize_path_segment(input: &str) -> Option<String> {
    let sanitized = sanitize_filename(input);
    let segment = sanitized.trim_start_matches(&['.', ' '][..]);
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

/// Repair names that were UTF-8 on the client but decoded as Latin-1 by a
/// multipart parser ("cafÃ©.jpg" becomes "café.jpg").
///
/// Names that are already correct are returned unchanged: a name is only
/// rewritten when every character fits in one byte, at least one is non-ASCII,
/// and those bytes form valid UTF-8.
pub fn repair_form_data_name(name: &str) -> String {
    if name.is_ascii() || name.chars().any(|c| c as u32 > 0xff) {
        return name.to_string();
    }

    let bytes: Vec<u8> = name.chars().map(|c| c as u32 as u8).collect();
    match String::from_utf8(bytes) {
        Ok(repaired) => repaired,
        Err(_) => name.to_string(),
    }
}
