//! Scalar and text generators.

use crate::collection::list_between;
use crate::dissect::Dissection;
use crate::error::{GenError, GenResult};
use crate::generate::Generator;
use crate::prng;
use crate::trim;
use falsify_card::{Cardinality, Shape};

/// Printable ASCII: digits, letters, punctuation and whitespace.
pub const PRINTABLE: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

/// ASCII letters, used for words.
pub const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Probability cutoffs and magnitude bounds for tiered integer draws. A
/// draw picks the first tier whose cutoff exceeds a uniform roll.
type Tiers = &'static [(f64, i64)];

const SMALL_TIERS: Tiers = &[(0.75, 10), (1.0, 100)];
const MEDIUM_TIERS: Tiers = &[(0.5, 10), (0.75, 100), (0.95, 1_000), (1.0, 10_000)];
const BIG_TIERS: Tiers = &[
    (0.25, 10),
    (0.5, 100),
    (0.75, 1_000),
    (0.95, 10_000),
    (1.0, 1_000_000),
];

/// Exponent range for floats: magnitudes lie in `[e^-15, e^15]`.
const FLOAT_EXPONENT: f64 = 15.0;

fn shrinking_int(value: i64, target: i64) -> Dissection<i64> {
    Dissection::unfold(value, vec![trim::towards(target)])
}

/// Fair boolean, shrinking to `false`.
pub fn boolean() -> Generator<bool> {
    Generator::new(Cardinality::constant(2), |state| {
        let (state, value) = prng::boolean(state);
        (state, Some(Dissection::unfold(value, vec![trim::falsify()])))
    })
}

/// Boolean that is `true` with probability `bias`.
pub fn biased(bias: f64) -> GenResult<Generator<bool>> {
    if !(0.0..=1.0).contains(&bias) {
        return Err(GenError::InvalidBias { bias });
    }
    Ok(Generator::new(Cardinality::constant(2), move |state| {
        let (state, roll) = prng::probability(state);
        let value = bias >= 1.0 || roll < bias;
        (state, Some(Dissection::unfold(value, vec![trim::falsify()])))
    }))
}

/// Uniform integer in `[lo, hi]`, shrinking toward the point of the range
/// closest to zero.
pub fn int_range(lo: i64, hi: i64) -> GenResult<Generator<i64>> {
    if lo > hi {
        return Err(GenError::bounds(lo, hi));
    }
    let target = lo.max(hi.min(0));
    Ok(Generator::new(Shape::IntRange(lo, hi).cardinality(), move |state| {
        let (state, value) = prng::int(state, lo, hi);
        (state, Some(shrinking_int(value, target)))
    }))
}

fn tiered(tiers: Tiers, signed: bool) -> Generator<i64> {
    let top = tiers.last().map_or(0, |(_, bound)| *bound);
    let width = if signed { 2 * top + 1 } else { top + 1 };
    Generator::new(Cardinality::constant(width as u64), move |state| {
        let (state, roll) = prng::probability(state);
        let bound = tiers
            .iter()
            .find(|(cutoff, _)| roll < *cutoff)
            .map_or(top, |(_, bound)| *bound);
        let lo = if signed { -bound } else { 0 };
        let (state, value) = prng::int(state, lo, bound);
        (state, Some(shrinking_int(value, 0)))
    })
}

/// Natural number, mostly below 10, at most 100.
pub fn small_nat() -> Generator<i64> {
    tiered(SMALL_TIERS, false)
}

/// Natural number, at most 10,000.
pub fn nat() -> Generator<i64> {
    tiered(MEDIUM_TIERS, false)
}

/// Natural number, at most 1,000,000.
pub fn big_nat() -> Generator<i64> {
    tiered(BIG_TIERS, false)
}

pub fn small_int() -> Generator<i64> {
    tiered(SMALL_TIERS, true)
}

/// Integer in `[-10_000, 10_000]`, mostly of small magnitude.
pub fn int() -> Generator<i64> {
    tiered(MEDIUM_TIERS, true)
}

pub fn big_int() -> Generator<i64> {
    tiered(BIG_TIERS, true)
}

/// Float of either sign with a log-uniform magnitude. Shrinks the integer
/// part toward zero first, then the fraction.
pub fn float() -> Generator<f64> {
    Generator::new(Cardinality::Infinite, |state| {
        let (state, negative) = prng::boolean(state);
        let (state, exponent) = prng::float(state, -FLOAT_EXPONENT, FLOAT_EXPONENT);
        let magnitude = exponent.exp();
        let value = if negative { -magnitude } else { magnitude };
        let trimmers = vec![trim::integer_part(0.0), trim::fraction_part(0.0)];
        (state, Some(Dissection::unfold(value, trimmers)))
    })
}

/// Uniform index below `len`, shrinking toward zero. `len` must be positive.
pub(crate) fn index_below(len: usize) -> Generator<usize> {
    let last = len.saturating_sub(1) as u64;
    Generator::new(Cardinality::constant(len as u64), move |state| {
        let (state, index) = prng::nat(state, 0, last);
        let d = shrinking_int(index as i64, 0).map(|i| *i as usize);
        (state, Some(d))
    })
}

/// One character of `alphabet`, shrinking toward its first character.
pub fn char_of(alphabet: &str) -> GenResult<Generator<char>> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(GenError::EmptyAlphabet);
    }
    Ok(index_below(chars.len()).map(move |i| chars[*i]))
}

fn alphabet_char(alphabet: &'static str) -> Generator<char> {
    let chars: Vec<char> = alphabet.chars().collect();
    index_below(chars.len()).map(move |i| chars[*i])
}

pub fn printable() -> Generator<char> {
    alphabet_char(PRINTABLE)
}

/// String over `alphabet` with length in `[lo, hi]`.
pub fn bounded_str(lo: usize, hi: usize, alphabet: &str) -> GenResult<Generator<String>> {
    if lo > hi {
        return Err(GenError::bounds(lo as i128, hi as i128));
    }
    let element = char_of(alphabet)?;
    Ok(list_between(lo, hi, element).map(|cs| cs.iter().collect()))
}

/// Printable string of tiered length.
pub fn str() -> Generator<String> {
    text(nat(), PRINTABLE)
}

/// Word of ASCII letters, usually short.
pub fn word() -> Generator<String> {
    text(small_nat(), LETTERS)
}

fn text(length: Generator<i64>, alphabet: &'static str) -> Generator<String> {
    let per_char = Cardinality::constant(alphabet.chars().count() as u64);
    let cardinality = per_char.pow(Cardinality::var(falsify_card::LENGTH_VAR));
    length.bind_with(cardinality, move |n| {
        list_between(0, *n as usize, alphabet_char(alphabet)).map(|cs| cs.iter().collect())
    })
}

/// One of the given values, shrinking toward the first.
pub fn one_of<T: Clone + 'static>(values: Vec<T>) -> GenResult<Generator<T>> {
    if values.is_empty() {
        return Err(GenError::EmptyChoice);
    }
    Ok(index_below(values.len()).map(move |i| values[*i].clone()))
}
