//! Conversions between A1-style cell references and 0-based (row, column) indexes.

/// Converts column letters ("A", "AB") to a 0-based column index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for letter in letters.chars() {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = (letter.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a 1-based row number string to a 0-based row index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts a cell reference such as "C12" to a 0-based (row, column) pair.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Converts a 0-based (row, column) pair to a cell reference such as "C12".
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    format!("{}{}", letters, row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("C12"), Some((11, 2)));
        assert_eq!(reference_to_index("AA3"), Some((2, 26)));
        assert_eq!(reference_to_index("XFD1048576"), Some((1_048_575, 16_383)));
    }

    #[test]
    fn rejects_malformed_references() {
        assert_eq!(reference_to_index(""), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("B"), None);
    }

    #[test]
    fn formats_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(11, 2), "C12");
        assert_eq!(index_to_reference(2, 26), "AA3");
        assert_eq!(index_to_reference(0, 701), "ZZ1");
    }
}
