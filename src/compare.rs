//! Compares the component seed output of two runs, e.g. different variants or
//! peer counts over the same input.

use crate::error::{input_error, mismatch_error, CcError};
use crate::tuples::Label;
use crate::util::io::get_file_lines;
use hashbrown::HashMap;
use log::info;

/// Succeeds when both files hold the same label multiset, in any order.
pub fn compare_seed_files(first: &str, second: &str) -> Result<(), CcError> {
    let first_counts = read_label_counts(first)?;
    let second_counts = read_label_counts(second)?;
    if first_counts == second_counts {
        info!("SUCCESS: '{}' and '{}' hold the same partitions", first, second);
        Ok(())
    } else {
        Err(mismatch_error(format!("'{}' and '{}' hold different partitions", first, second)))
    }
}

fn read_label_counts(path: &str) -> Result<HashMap<Label, usize>, CcError> {
    let mut counts = HashMap::new();
    for line in get_file_lines(path)? {
        let label: Label = line.trim().parse().map_err(|e| {
            input_error(format!("'{}' has a malformed seed line '{}': {}", path, line, e))
        })?;
        *counts.entry(label).or_insert(0) += 1;
    }
    info!("{} has {} partitions", path, counts.len());
    Ok(counts)
}
