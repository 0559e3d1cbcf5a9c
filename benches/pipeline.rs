// benches/pipeline.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use grace_scan::{
    csv::{sniff, SniffMode},
    Archive, ArchiveFile, Session, Taxonomy,
};

const HEADER: &str =
    "DSP;REF_PM;ID;CODE_ERREUR;NATURE_ERREUR;TABLE;REF_ELEMENT;C8;C9;C10;C11;C12;C13;C14;C15";
const CODES: [&str; 6] = ["ANO_CABLE_3", "BPE_126_A", "PBO_101_A", "ZNRO_128_B", "X_TIROIR_9", "ZZZ_1"];

fn data_file(rows: usize, seed: usize) -> String {
    let mut out = vec![HEADER.to_string()];
    for i in 0..rows {
        let mut cells = vec![""; 15];
        cells[0] = "ABC";
        cells[3] = CODES[(i + seed) % CODES.len()];
        cells[4] = "Description de l'anomalie";
        out.push(cells.join(";"));
    }
    out.join("\n")
}

/// Synthetic batch: `elements` elements, each observed on `days` days.
fn batch(elements: usize, days: usize, rows: usize) -> Vec<Archive> {
    let mut runs = Vec::new();
    for e in 0..elements {
        for d in 0..days {
            let element = format!("SRO-ABC-{e:05}");
            let stamp = format!("202504{:02}094325", d + 1);
            runs.push(Archive::new(
                format!("run_{element}_{stamp}.zip"),
                vec![
                    ArchiveFile::new(format!("RAPPORT_SYNTHESE_GV3_SRO_{element}_{stamp}.txt"), ""),
                    ArchiveFile::new("ANOMALIES.csv", data_file(rows, e + d)),
                ],
            ));
        }
    }
    runs
}

fn bench_pipeline(c: &mut Criterion) {
    let text = data_file(2_000, 0);
    c.bench_function("sniff_2000_rows", |b| {
        b.iter(|| sniff(black_box(&text), SniffMode::Data).map(|t| t.rows.len()))
    });

    let tax = Taxonomy::builtin();
    c.bench_function("classify_mixed", |b| {
        b.iter(|| {
            for code in CODES {
                black_box(tax.classify(black_box(code)));
            }
        })
    });

    let runs = batch(20, 4, 250);
    c.bench_function("analyze_and_diff_20x4", |b| {
        b.iter(|| {
            let mut session = Session::new(tax.clone());
            session.analyze(black_box(runs.as_slice()), None);
            session.select_all();
            black_box(session.diff().map(|r| r.rows.len()).unwrap_or(0))
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
