//! rpm's segment-wise version string comparison

use std::cmp::Ordering;

fn is_separator(c: u8) -> bool {
    !c.is_ascii_alphanumeric() && c != b'~' && c != b'^'
}

/// Compare two version (or release) strings the way `rpmvercmp` does.
///
/// Strings are split into maximal runs of digits or letters; everything else
/// only separates segments. Numeric segments compare numerically and are
/// newer than alphabetic ones. `~` sorts before anything, even the end of
/// the string, and `^` sorts after the end of the string but before any
/// further segment.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < one.len() || j < two.len() {
        while i < one.len() && is_separator(one[i]) {
            i += 1;
        }
        while j < two.len() && is_separator(two[j]) {
            j += 1;
        }

        let c1 = one.get(i).copied();
        let c2 = two.get(j).copied();

        if c1 == Some(b'~') || c2 == Some(b'~') {
            if c1 != Some(b'~') {
                return Ordering::Greater;
            }
            if c2 != Some(b'~') {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if c1 == Some(b'^') || c2 == Some(b'^') {
            if c1.is_none() {
                return Ordering::Less;
            }
            if c2.is_none() {
                return Ordering::Greater;
            }
            if c1 != Some(b'^') {
                return Ordering::Greater;
            }
            if c2 != Some(b'^') {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        let (Some(c1), Some(_)) = (c1, c2) else {
            break;
        };

        let is_num = c1.is_ascii_digit();
        let matches_kind = |c: u8| if is_num { c.is_ascii_digit() } else { c.is_ascii_alphabetic() };

        let start1 = i;
        while i < one.len() && matches_kind(one[i]) {
            i += 1;
        }
        let start2 = j;
        while j < two.len() && matches_kind(two[j]) {
            j += 1;
        }

        let seg1 = &one[start1..i];
        let seg2 = &two[start2..j];

        // Segments of different kinds: numbers are newer than letters
        if seg2.is_empty() {
            return if is_num { Ordering::Greater } else { Ordering::Less };
        }

        let ord = if is_num {
            let seg1 = strip_leading_zeros(seg1);
            let seg2 = strip_leading_zeros(seg2);
            seg1.len().cmp(&seg2.len()).then_with(|| seg1.cmp(seg2))
        } else {
            seg1.cmp(seg2)
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    match (i >= one.len(), j >= two.len()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn strip_leading_zeros(segment: &[u8]) -> &[u8] {
    let zeros = segment.iter().take_while(|&&c| c == b'0').count();
    &segment[zeros..]
}
