//! 商品名解析のベンチマーク
//!
//! 小さな組み込み辞書を用いて、索引用と検索語用の設定での解析速度と、
//! 曖昧さの大きい長い入力に対する探索の速度を計測します。

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sangpum::dictionary::{
    DictionaryEntry, DictionaryKind, DictionarySource, SetDictionary, SourceDictionary,
    SynonymDictionary,
};
use sangpum::{Analyzer, AnalyzerOption, ProductNameDictionary, TagProbDictionary};

const TITLES: &[&str] = &[
    "삼성 노트북 i7-4700mq 15인치 1,024gb ssd",
    "무선 마우스 블루투스 5.0 저소음",
    "노트북케이스 13인치 방수 가방",
    "여름 원피스 100cm 무료배송",
    "LG 올레드 TV 65인치 OLED65C1",
    "캠핑 의자 120x60cm 접이식 3kg",
];

fn build_dictionary() -> ProductNameDictionary {
    let system = TagProbDictionary::from_lines(
        [
            "노트북\tNNG\t-5.0",
            "케이스\tNNG\t-6.0",
            "가방\tNNG\t-5.5",
            "무선\tNNG\t-6.0",
            "마우스\tNNG\t-6.0",
            "원피스\tNNG\t-7.0",
            "의자\tNNG\t-6.5",
            "캠핑\tNNG\t-7.0",
            "여름\tNNG\t-6.0",
            "배송\tNNG\t-6.0",
            "무료\tNNG\t-6.0",
            "인치\tNNG\t-6.0",
            "에\tJKB\t-3.0",
        ],
        true,
    );
    let unit = SetDictionary::from_lines(["cm", "gb", "kg", "인치"], true);
    let unit_synonym = SynonymDictionary::from_lines(["cm\t센티", "\t인치,inch"], true);
    let synonym = SynonymDictionary::from_lines(["\tTV,티비", "노트북\t랩탑"], true);
    let stop = SetDictionary::from_lines(["무료"], true);
    ProductNameDictionary::from_parts(
        system,
        [
            DictionaryEntry::new("unit", DictionaryKind::Set, SourceDictionary::Set(unit)),
            DictionaryEntry::new(
                "unit_synonym",
                DictionaryKind::Synonym2Way,
                SourceDictionary::Synonym(unit_synonym),
            ),
            DictionaryEntry::new(
                "synonym",
                DictionaryKind::Synonym2Way,
                SourceDictionary::Synonym(synonym),
            ),
            DictionaryEntry::new("stop", DictionaryKind::Set, SourceDictionary::Set(stop)),
        ],
    )
}

fn bench_analysis(c: &mut Criterion) {
    let dict = Arc::new(build_dictionary());
    let total_bytes: usize = TITLES.iter().map(|t| t.len()).sum();

    let mut group = c.benchmark_group("Analysis Speed");
    group.throughput(Throughput::Bytes(total_bytes as u64));
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    for (name, option) in [
        ("Index", AnalyzerOption::default()),
        ("Query", AnalyzerOption::default().use_for_query(true).use_full_string(true)),
    ] {
        group.bench_function(BenchmarkId::new(name, "Titles"), |b| {
            let analyzer = Analyzer::from_shared_dictionary(dict.clone()).option(option);
            let mut worker = analyzer.new_worker();
            b.iter(|| {
                for title in TITLES {
                    worker.reset_sentence(title);
                    worker.analyze();
                }
                worker.num_tokens()
            });
        });
    }
    group.finish();
}

fn bench_ambiguous(c: &mut Criterion) {
    let system = TagProbDictionary::from_lines(
        ["가\tNNG\t-14.0", "가가\tNNG\t-8.0", "가가가\tNNG\t-9.0"],
        true,
    );
    let analyzer = Analyzer::new(ProductNameDictionary::from_parts(system, []));
    let input = "가".repeat(2_000);

    let mut group = c.benchmark_group("Ambiguous Input");
    group.sample_size(20);
    for fast_result in [true, false] {
        let analyzer = analyzer
            .clone()
            .option(AnalyzerOption::default().fast_result(fast_result));
        let mut worker = analyzer.new_worker();
        worker.reset_sentence(&input);
        group.bench_function(BenchmarkId::new("FastResult", fast_result), |b| {
            b.iter(|| {
                worker.analyze();
                worker.peak_queue_len()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analysis, bench_ambiguous);
criterion_main!(benches);
