//! Symbolic rendering of stat mode bits (`drwxr-xr-x` style)
//!
//! Bit values follow the Linux on-disk layout, which is what every directory
//! decoder hands us regardless of the host platform.

pub const S_IFMT: u32 = 0o170000;
pub const S_IFSOCK: u32 = 0o140000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFIFO: u32 = 0o010000;

pub const S_ISUID: u32 = 0o4000;
pub const S_ISGID: u32 = 0o2000;
pub const S_ISVTX: u32 = 0o1000;

pub const S_IRUSR: u32 = 0o400;
pub const S_IWUSR: u32 = 0o200;
pub const S_IXUSR: u32 = 0o100;
pub const S_IRGRP: u32 = 0o040;
pub const S_IWGRP: u32 = 0o020;
pub const S_IXGRP: u32 = 0o010;
pub const S_IROTH: u32 = 0o004;
pub const S_IWOTH: u32 = 0o002;
pub const S_IXOTH: u32 = 0o001;

/// Type letters, checked in order; the first match wins.
const TYPE_LETTERS: [(u32, char); 7] = [
    (S_IFBLK, 'b'),
    (S_IFCHR, 'c'),
    (S_IFDIR, 'd'),
    (S_IFREG, '-'),
    (S_IFIFO, 'p'),
    (S_IFLNK, 'l'),
    (S_IFSOCK, 's'),
];

/// Permission bits in display order, with the letter shown when set.
const PERMISSION_LETTERS: [(u32, char); 9] = [
    (S_IRUSR, 'r'),
    (S_IWUSR, 'w'),
    (S_IXUSR, 'x'),
    (S_IRGRP, 'r'),
    (S_IWGRP, 'w'),
    (S_IXGRP, 'x'),
    (S_IROTH, 'r'),
    (S_IWOTH, 'w'),
    (S_IXOTH, 'x'),
];

pub fn is_dir(mode: u32) -> bool {
    mode & S_IFMT == S_IFDIR
}

pub fn is_reg(mode: u32) -> bool {
    mode & S_IFMT == S_IFREG
}

/// Single character describing the file type, `?` when unknown
pub fn type_letter(mode: u32) -> char {
    TYPE_LETTERS
        .iter()
        .find(|(kind, _)| mode & S_IFMT == *kind)
        .map(|(_, letter)| *letter)
        .unwrap_or('?')
}

/// Render `mode` as a 10-character string such as `-rw-r--r--`.
///
/// Set-user-id and set-group-id replace the owner and group execute slot
/// with `s` (execute also set) or `S` (execute clear). The sticky bit does
/// the same to the other execute slot with `t`/`T`.
pub fn format_mode(mode: u32) -> String {
    let mut out = [b'-'; 10];
    out[0] = type_letter(mode) as u8;
    for (i, (bit, letter)) in PERMISSION_LETTERS.iter().enumerate() {
        if mode & bit != 0 {
            out[i + 1] = *letter as u8;
        }
    }

    let specials = [(S_ISUID, 3, b's'), (S_ISGID, 6, b's'), (S_ISVTX, 9, b't')];
    for (bit, slot, letter) in specials {
        if mode & bit != 0 {
            out[slot] = if out[slot] == b'x' {
                letter
            } else {
                letter.to_ascii_uppercase()
            };
        }
    }

    out.iter().map(|&b| b as char).collect()
}
