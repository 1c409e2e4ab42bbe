//! Parameter grid enumeration
//!
//! A sweep is the cartesian product of its axes. Enumeration is
//! lexicographic in axis order with the last axis varying fastest, so for
//! limits `[10, 40]` and thresholds `[INVERSE, INVERSESQRT]` the sweep visits
//! `(10, INVERSE)`, `(10, INVERSESQRT)`, `(40, INVERSE)`, `(40, INVERSESQRT)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Worker flags the driver sets itself; extra axes may not reuse them.
pub const RESERVED_FLAGS: &[&str] = &[
    "limit",
    "stored-questions",
    "debug-level",
    "blocking-method",
    "tight-threshold",
    "output-format",
    "write-csv-column-names",
];

/// Cartesian product of `axes`, last axis varying fastest.
///
/// An empty axis anywhere yields no combinations. No axes at all yields a
/// single empty combination.
pub fn cartesian_product<T: Clone>(axes: &[Vec<T>]) -> Vec<Vec<T>> {
    if axes.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    let mut combinations = Vec::with_capacity(product_len(axes.iter().map(Vec::len)));
    let mut indices = vec![0usize; axes.len()];

    loop {
        combinations.push(
            indices
                .iter()
                .zip(axes)
                .map(|(&idx, axis)| axis[idx].clone())
                .collect(),
        );

        // Odometer increment from the last axis
        let mut carry = true;
        for (index, axis) in indices.iter_mut().zip(axes).rev() {
            *index += 1;
            if *index < axis.len() {
                carry = false;
                break;
            }
            *index = 0;
        }

        if carry {
            break;
        }
    }

    combinations
}

fn product_len(lens: impl Iterator<Item = usize>) -> usize {
    lens.fold(1usize, |acc, len| acc.saturating_mul(len))
}

/// An additional swept worker flag, passed as `--<flag>=<value>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagAxis {
    /// Flag name without the leading dashes, e.g. `num-criteria`
    pub flag: String,
    pub values: Vec<String>,
}

/// One flag assignment within a combination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagValue {
    pub flag: String,
    pub value: String,
}

/// One fully specified point of the sweep
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    /// Question limit; also the cache key
    pub limit: i64,
    /// Tight-threshold function name, e.g. `INVERSESQRT`
    pub tight_threshold: String,
    /// Values for the extra axes, in axis order
    pub extra: Vec<FlagValue>,
}

impl Combination {
    pub fn new(limit: i64, tight_threshold: impl Into<String>) -> Self {
        Self {
            limit,
            tight_threshold: tight_threshold.into(),
            extra: Vec::new(),
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "limit={}, tight-threshold={}",
            self.limit, self.tight_threshold
        )?;
        for FlagValue { flag, value } in &self.extra {
            write!(f, ", {flag}={value}")?;
        }
        Ok(())
    }
}

/// The axes of a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub limits: Vec<i64>,
    pub tight_thresholds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_axes: Vec<FlagAxis>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            limits: vec![10, 40, 100, 250, 500],
            tight_thresholds: vec![
                "INVERSE".to_string(),
                "INVERSESQRT".to_string(),
                "INVERSELOG".to_string(),
            ],
            extra_axes: Vec::new(),
        }
    }
}

impl ParameterGrid {
    pub fn new(limits: Vec<i64>, tight_thresholds: Vec<String>) -> Self {
        Self {
            limits,
            tight_thresholds,
            extra_axes: Vec::new(),
        }
    }

    /// Add a swept worker flag after the existing axes
    #[must_use]
    pub fn with_axis(mut self, flag: impl Into<String>, values: Vec<String>) -> Self {
        self.extra_axes.push(FlagAxis {
            flag: flag.into(),
            values,
        });
        self
    }

    /// Number of combinations, without materializing them
    pub fn len(&self) -> usize {
        product_len(
            [self.limits.len(), self.tight_thresholds.len()]
                .into_iter()
                .chain(self.extra_axes.iter().map(|a| a.values.len())),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject extra axes whose flags would clash with the driver's own flags
    pub fn validate(&self) -> Result<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.extra_axes.len());
        for axis in &self.extra_axes {
            let flag = axis.flag.as_str();
            if flag.is_empty() || flag.starts_with('-') || flag.contains('=') {
                return Err(SweepError::Config(format!(
                    "invalid axis flag name {flag:?} (expected e.g. \"num-criteria\")"
                )));
            }
            if RESERVED_FLAGS.contains(&flag) {
                return Err(SweepError::Config(format!(
                    "axis flag --{flag} is set by the driver and cannot be swept"
                )));
            }
            if seen.contains(&flag) {
                return Err(SweepError::Config(format!("axis flag --{flag} listed twice")));
            }
            seen.push(flag);
        }
        Ok(())
    }

    /// All combinations in sweep order
    pub fn combinations(&self) -> Vec<Combination> {
        let mut axes: Vec<Vec<usize>> = vec![
            (0..self.limits.len()).collect(),
            (0..self.tight_thresholds.len()).collect(),
        ];
        axes.extend(self.extra_axes.iter().map(|a| (0..a.values.len()).collect()));

        cartesian_product(&axes)
            .into_iter()
            .map(|idx| Combination {
                limit: self.limits[idx[0]],
                tight_threshold: self.tight_thresholds[idx[1]].clone(),
                extra: self
                    .extra_axes
                    .iter()
                    .zip(&idx[2..])
                    .map(|(axis, &i)| FlagValue {
                        flag: axis.flag.clone(),
                        value: axis.values[i].clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}
