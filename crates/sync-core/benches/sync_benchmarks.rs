use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use sync_core::{
    BlobVariant, Classifier, DetachedStore, DiffBuilder, SyncTriple, TreeVariant, Variant,
};
use sync_fs::NormalizedPath;

/// A two-level tree with `width` folders of `width` files each.
fn wide_tree(width: usize, edited: usize) -> Variant {
    let root = NormalizedPath::root();
    let folders = (0..width)
        .map(|f| {
            let folder = root.join(&format!("dir{f:04}"));
            let files = (0..width)
                .map(|i| {
                    let id = if f == edited && i == edited { "edited" } else { "same" };
                    BlobVariant::new(folder.join(&format!("file{i:04}.txt")))
                        .with_content_id(id)
                        .into()
                })
                .collect();
            TreeVariant::new(folder).with_members(files).into()
        })
        .collect();
    TreeVariant::new(root).with_members(folders).into()
}

fn benchmark_classify(c: &mut Criterion) {
    let base: Variant = BlobVariant::new("file.txt")
        .with_content_id("1")
        .with_ancestry((0..64).map(|i| format!("c{i}")))
        .into();
    let remote: Variant = BlobVariant::new("file.txt")
        .with_content_id("2")
        .with_ancestry((0..65).map(|i| format!("c{}", i as i64 - 1)))
        .into();
    let triple = SyncTriple::new(Some(base.clone()), Some(base), Some(remote));
    let classifier = Classifier::new(&DetachedStore);

    c.bench_function("classify_incoming_change", |b| {
        b.iter(|| classifier.classify(black_box(&triple)).unwrap());
    });
}

fn benchmark_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_tree");
    let left = wide_tree(64, usize::MAX);
    let right = wide_tree(64, 7);
    let builder = DiffBuilder::new(&DetachedStore);

    group.bench_function("identical_4096_files", |b| {
        b.iter(|| builder.diff(black_box(&left), black_box(&left)).unwrap());
    });
    group.bench_function("single_edit_4096_files", |b| {
        b.iter(|| builder.diff(black_box(&left), black_box(&right)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_classify, benchmark_diff);
criterion_main!(benches);
