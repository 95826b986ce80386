//! Bounded uniform row sampling over large files.
//!
//! Row positions are drawn uniformly without replacement across the whole
//! file, bucketed by owning row group through the shared [`RowGroupMap`],
//! and each needed group is read exactly once. The full file is never
//! materialized.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::fetch::Page;
use crate::reader::FileHandle;

/// Draw `size` rows uniformly at random, without replacement and without
/// reading any row group twice. Deterministic when `seed` is supplied.
/// Returns exactly `min(size, row_count)` rows, in file order.
pub fn draw(handle: &FileHandle, size: usize, seed: Option<u64>) -> Result<Page> {
    let total = handle.row_count();
    let n = size.min(total);

    if n == total {
        // Sample covers the file; a plain read is both cheaper and exact.
        let df = handle.scan()?.collect()?;
        return Ok(page(df));
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let mut positions = rand::seq::index::sample(&mut rng, total, n).into_vec();
    positions.sort_unstable();

    let mut result: Option<DataFrame> = None;
    let mut cursor = 0usize;
    for span in handle.row_groups().spans() {
        // Local offsets of the sampled positions owned by this group.
        let begin = cursor;
        while cursor < positions.len() && positions[cursor] < span.end_row {
            cursor += 1;
        }
        if cursor == begin {
            continue;
        }
        let locals: Vec<u32> = positions[begin..cursor]
            .iter()
            .map(|&p| (p - span.start_row) as u32)
            .collect();

        let group = handle
            .scan()?
            .slice(span.start_row as i64, span.len() as IdxSize)
            .collect()?;
        let idx = UInt32Chunked::from_vec(PlSmallStr::from_static("idx"), locals);
        let part = group.take(&idx)?;

        result = Some(match result {
            Some(acc) => acc.vstack(&part)?,
            None => part,
        });
        if cursor == positions.len() {
            break;
        }
    }

    let df = match result {
        Some(df) => df,
        None => handle.scan()?.slice(0, 0).collect()?,
    };
    Ok(page(df))
}

fn page(df: DataFrame) -> Page {
    let n = df.height();
    Page {
        df,
        start: 0,
        end: n,
        total_rows: n,
        slow_path: false,
    }
}
