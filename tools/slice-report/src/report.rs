//! 统计结果.

use hip_slices::Batch;
use itertools::Itertools;
use std::io::{self, Write};

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
fn sep() {
    println!("{SEP}");
}

/// 单个批数组的数值概况. 只统计已加载的样本.
pub struct Summary {
    shape: Vec<usize>,
    loaded: usize,
    min: f32,
    max: f32,
    mean: f64,
}

impl Summary {
    fn of(batch: &Batch) -> Self {
        let images = batch.images();
        let loaded = batch.loaded();
        let rows = images.outer_iter().take(loaded);
        let (mut min, mut max, mut sum, mut count) = (f32::INFINITY, f32::NEG_INFINITY, 0f64, 0usize);
        for &v in rows.flat_map(|r| r.into_iter()) {
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
            count += 1;
        }
        Self {
            shape: images.shape().to_vec(),
            loaded,
            min,
            max,
            mean: if count == 0 { f64::NAN } else { sum / count as f64 },
        }
    }
}

/// 将 `s` 写进 `w` 中.
fn describe_into<W: Write>(name: &str, s: &Summary, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Batch `{name}`:")?;
    writeln!(w, "{S4}Shape: {:?}", s.shape)?;
    writeln!(w, "{S4}Loaded samples: {}", s.loaded)?;
    writeln!(w, "{S4}Min: {:.6}", s.min)?;
    writeln!(w, "{S4}Max: {:.6}", s.max)?;
    write!(w, "{S4}Mean: {:.6}", s.mean)?;
    Ok(())
}

/// 一个划分的概览.
pub struct SliceReport {
    partition: String,
    images: Summary,
    segmentations: Summary,
    /// (标签, 像素数), 按标签升序.
    labels: Vec<(i64, usize)>,
}

impl SliceReport {
    pub fn new(partition: &str, images: &Batch, segs: &Batch) -> Self {
        let labels = segs
            .images()
            .outer_iter()
            .take(segs.loaded())
            .flat_map(|r| r.into_iter().map(|&v| v.round() as i64))
            .counts()
            .into_iter()
            .sorted()
            .collect();
        Self {
            partition: partition.to_owned(),
            images: Summary::of(images),
            segmentations: Summary::of(segs),
            labels,
        }
    }

    /// 输出概览.
    pub fn analyze(&self) {
        sep();
        println!("Partition `{}`", self.partition);
        sep();

        let mut buf = Vec::with_capacity(512);
        for (name, s) in [("images", &self.images), ("segmentations", &self.segmentations)] {
            if describe_into(name, s, &mut buf).is_ok() {
                println!("{}", String::from_utf8_lossy(&buf));
            }
            buf.clear();
            sep();
        }

        println!("Label histogram:");
        for (label, n) in &self.labels {
            println!("    {label}: {n}");
        }
        sep();
    }
}
