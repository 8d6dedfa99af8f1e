//! Benchmarks for locator rewriting and placeholder substitution.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;
use terraform_pack::rewrite::{replace_in_directory, ReferenceRewriter, RegexRewriter};

const MODULE_BLOCK: &str = r#"module "network" {
  source  = "//modules/network:network"
  version = "1.2.3"
  cidr    = "10.0.0.0/16"
}

resource "null_resource" "noop" {
  triggers = {
    pkg = "$PKG_DIR/$NAME"
  }
}
"#;

fn create_config(root: &Path, num_files: usize) {
    for i in 0..num_files {
        fs::write(root.join(format!("file{}.tf", i)), MODULE_BLOCK).unwrap();
    }
}

fn bench_rewrite_contents(c: &mut Criterion) {
    let rewriter = RegexRewriter::new();
    let source = regex::Regex::new(r#"source\s*=\s*"//modules/network:network""#).unwrap();
    let large = MODULE_BLOCK.repeat(200);

    let mut group = c.benchmark_group("rewrite_contents");
    group.bench_function("single_block", |b| {
        b.iter(|| rewriter.rewrite_contents(&source, black_box("/out/.modules/net"), black_box(MODULE_BLOCK)))
    });
    group.bench_function("large_file", |b| {
        b.iter(|| rewriter.rewrite_contents(&source, black_box("/out/.modules/net"), black_box(&large)))
    });
    group.finish();
}

fn bench_rewrite_tree(c: &mut Criterion) {
    let rewriter = RegexRewriter::new();
    let mut group = c.benchmark_group("rewrite_tree");

    for count in [10, 100] {
        group.bench_with_input(BenchmarkId::new("files", count), &count, |b, &count| {
            b.iter_with_setup(
                || {
                    let tree = TempDir::new().unwrap();
                    create_config(tree.path(), count);
                    tree
                },
                |tree| {
                    rewriter
                        .rewrite("//modules/network:network", "/out/.modules/net", tree.path())
                        .unwrap();
                    tree
                },
            )
        });
    }

    group.finish();
}

fn bench_replace_in_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_in_directory");

    for count in [10, 100] {
        group.bench_with_input(BenchmarkId::new("files", count), &count, |b, &count| {
            b.iter_with_setup(
                || {
                    let tree = TempDir::new().unwrap();
                    create_config(tree.path(), count);
                    tree
                },
                |tree| {
                    replace_in_directory(tree.path(), "$PKG_DIR", "infra/prod").unwrap();
                    tree
                },
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rewrite_contents,
    bench_rewrite_tree,
    bench_replace_in_directory
);
criterion_main!(benches);
