//! Edit distances over Unicode scalar values.

use super::normalize::normalize;

/// Classic Levenshtein distance (insert, delete, substitute; unit costs),
/// computed over `char`s so Cyrillic text counts one edit per letter.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max(len)`, in `[0, 1]`. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(a, b) as f32;
    (1.0 - distance / max_len as f32).clamp(0.0, 1.0)
}

fn levenshtein_matrix(a: &[char], b: &[char]) -> Vec<Vec<usize>> {
    let mut memory = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in memory.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        memory[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            memory[i][j] = (memory[i - 1][j] + 1)
                .min(memory[i][j - 1] + 1)
                .min(memory[i - 1][j - 1] + cost);
        }
    }
    memory
}

/// Distance for short names, rewarding shared letters.
///
/// Both inputs are normalized. The result is the Levenshtein distance minus
/// half the number of equal characters on the optimal alignment path minus
/// twice the longest run of consecutive equal characters on that path. Lower
/// is closer; strong matches are negative.
pub fn custom_string_distance(a: &str, b: &str) -> i32 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    let memory = levenshtein_matrix(&a, &b);

    let (mut i, mut j) = (a.len(), b.len());
    let mut matching = 0i32;
    let mut run = 0i32;
    let mut longest_run = 0i32;

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] && memory[i][j] == memory[i - 1][j - 1] {
            matching += 1;
            run += 1;
            longest_run = longest_run.max(run);
            i -= 1;
            j -= 1;
            continue;
        }

        run = 0;
        if i > 0 && j > 0 && memory[i][j] == memory[i - 1][j - 1] + 1 {
            i -= 1;
            j -= 1;
        } else if i > 0 && memory[i][j] == memory[i - 1][j] + 1 {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    memory[a.len()][b.len()] as i32 - matching / 2 - 2 * longest_run
}

/// Distance between a spoken query and a stored name.
///
/// Takes the best of the whole name and each of its words, so "маме" finds
/// "Мама Лена" as readily as "Мама".
pub fn name_distance(query: &str, name: &str) -> i32 {
    let whole = custom_string_distance(query, name);
    let normalized = normalize(name);
    normalized
        .split_whitespace()
        .map(|word| custom_string_distance(query, word))
        .fold(whole, i32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("маме", "мама"), 1);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("да", "до"), 1);
        assert_eq!(levenshtein("ёж", "еж"), 1);
    }

    #[test]
    fn test_similarity_identity_and_empty() {
        assert_eq!(similarity("который час", "который час"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "который час"), 0.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let pairs = [("позвони маме", "позвони маше"), ("abc", "abcdef"), ("да", "нет")];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_similarity_decreases_with_distance() {
        let example = "поставь таймер";
        let close = similarity("поставь таймер", example);
        let near = similarity("поставь таймеры", example);
        let far = similarity("поставь", example);
        assert!(close > near);
        assert!(near > far);
    }

    #[test]
    fn test_custom_distance_rewards_shared_prefix() {
        assert_eq!(custom_string_distance("маме", "мама"), -6);
        assert_eq!(custom_string_distance("Мама", "мама"), -10);
        assert_eq!(custom_string_distance("сон", "пицца"), 5);
    }

    #[test]
    fn test_name_distance_uses_best_word() {
        assert_eq!(name_distance("маме", "Мама Лена"), -6);
        assert!(name_distance("маме", "Игорь") > 1);
    }
}
