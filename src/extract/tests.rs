use super::*;
use crate::document::OutlineEntry;

struct FixtureDocument {
    outline: Vec<OutlineEntry>,
    pages: Vec<String>,
}

impl FixtureDocument {
    fn new(outline: Vec<(u32, &str, u32)>, pages: Vec<&str>) -> Self {
        Self {
            outline: outline
                .into_iter()
                .map(|(level, title, page)| OutlineEntry {
                    level,
                    title: title.to_string(),
                    page,
                })
                .collect(),
            pages: pages.into_iter().map(ToOwned::to_owned).collect(),
        }
    }
}

impl PageSource for FixtureDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> String {
        self.pages
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }
}

#[test]
fn zeimu_single_page_end_to_end() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 総論", 1), (2, "第1節 基礎", 1)],
        vec!["例題 1 期首残高の処理（Ａ）\n本文テキスト\n", "続きのページ\n"],
    );

    let records = extract_examples(&doc, Subject::Zeimu, "zeimu.pdf");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.subject, Subject::Zeimu);
    assert_eq!(record.chapter_no, 1);
    assert_eq!(record.chapter_title, "総論");
    assert_eq!(record.section_no, 1);
    assert_eq!(record.section_title, "基礎");
    assert_eq!(record.example_no, 1);
    assert_eq!(record.title, "期首残高の処理");
    assert_eq!(record.rank.as_deref(), Some("A"));
    assert_eq!(record.rank_oral.as_deref(), Some("A"));
    assert_eq!(record.rank_written, None);
    assert_eq!(record.source_page, 1);
    assert_eq!(record.source_document, "zeimu.pdf");
}

#[test]
fn page_ref_carries_forward_until_replaced() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 総論", 1)],
        vec![
            "法個-3\n例題 1 一つ目\n",
            "例題 2 引用なしのページ\n",
            "法個-7\n例題 3 三つ目\n",
        ],
    );

    let records = extract_examples(&doc, Subject::Zeimu, "zeimu.pdf");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].page_ref.as_deref(), Some("法個-3"));
    // page 2 has no citation of its own and inherits page 1's
    assert_eq!(records[1].page_ref.as_deref(), Some("法個-3"));
    assert_eq!(records[2].page_ref.as_deref(), Some("法個-7"));
}

#[test]
fn page_ref_is_none_before_any_match() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 総論", 1)],
        vec!["例題 1 引用より前\n"],
    );

    let records = extract_examples(&doc, Subject::Zeimu, "zeimu.pdf");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].page_ref, None);
}

#[test]
fn headers_before_first_chapter_are_dropped() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 総論", 3)],
        vec![
            "例題 9 前付けに現れる例題\n",
            "目次\n",
            "例題 1 本文の例題\n",
        ],
    );

    let records = extract_examples(&doc, Subject::Zeimu, "zeimu.pdf");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].example_no, 1);
    assert_eq!(records[0].source_page, 3);
}

#[test]
fn records_stay_within_chapter_and_section_spans() {
    let doc = FixtureDocument::new(
        vec![
            (1, "第1章 総論", 1),
            (2, "第1節 目的", 1),
            (2, "第2節 範囲", 3),
            (1, "第2章 各論", 4),
        ],
        vec![
            "例題 1 甲\n",
            "例題 2 乙\n",
            "例題 3 丙\n",
            "例題 1 丁\n",
        ],
    );

    let records = extract_examples(&doc, Subject::Zeimu, "zeimu.pdf");
    assert_eq!(records.len(), 4);

    for record in &records {
        assert!(record.source_page >= 1);
    }
    assert_eq!(
        records
            .iter()
            .map(|r| (r.chapter_no, r.section_no))
            .collect::<Vec<_>>(),
        vec![(1, 1), (1, 1), (1, 2), (2, 0)]
    );
    // example_no repeats across chapters without deduplication
    assert_eq!(records[0].example_no, records[3].example_no);
}

#[test]
fn zaimu_compat_rank_prefers_oral_then_written() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 金融商品", 1)],
        vec!["例題 1 減損会計\n短答:A 論文:B\n例題 2 リース取引\n短答:C\n例題 3 注記\n"],
    );

    let records = extract_examples(&doc, Subject::Zaimu, "zaimu.pdf");
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].rank_written.as_deref(), Some("A"));
    assert_eq!(records[0].rank_oral.as_deref(), Some("B"));
    assert_eq!(records[0].rank.as_deref(), Some("B"));

    assert_eq!(records[1].rank_written.as_deref(), Some("C"));
    assert_eq!(records[1].rank_oral, None);
    assert_eq!(records[1].rank.as_deref(), Some("C"));

    assert_eq!(records[2].rank, None);
}

#[test]
fn zaimu_page_ref_folds_circled_digits() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 金融商品", 1)],
        vec!["①-23\n例題 1 有価証券\n"],
    );

    let records = extract_examples(&doc, Subject::Zaimu, "zaimu.pdf");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].page_ref.as_deref(), Some("1-23"));
}

#[test]
fn zaimu_body_cross_references_do_not_become_citations() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 金融商品", 1)],
        vec![
            "例題 1 減損会計\n前期 3-1 の論点を参照\n①-23\n",
            "例題 2 資産除去債務\n本文は 2-4 を参照\n補足\n続き\n解説\n①-30\n",
        ],
    );

    let records = extract_examples(&doc, Subject::Zaimu, "zaimu.pdf");
    assert_eq!(records.len(), 2);
    // the printed citation at the page bottom wins over N-M prose
    assert_eq!(records[0].page_ref.as_deref(), Some("1-23"));
    assert_eq!(records[1].page_ref.as_deref(), Some("1-30"));
}

#[test]
fn kanri_reconciles_ranks_from_front_matter_index() {
    let doc = FixtureDocument::new(
        // bookmarks are unreliable for this series and go unused
        vec![(1, "だい3しょう", 1)],
        vec![
            "【第3章 材料費】\n３－１ Ｂ-Ａ 材料副費の処理 ③- 7\n",
            "例題3-1 材料副費の処理\n本文テキスト\n",
        ],
    );

    let records = extract_examples(&doc, Subject::Kanri, "kanri.pdf");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.chapter_no, 3);
    assert_eq!(record.chapter_title, "材料費");
    assert_eq!(record.section_no, 0);
    assert_eq!(record.section_title, "");
    assert_eq!(record.example_no, 1);
    assert_eq!(record.title, "材料副費の処理");
    assert_eq!(record.rank_written.as_deref(), Some("B"));
    assert_eq!(record.rank_oral.as_deref(), Some("A"));
    assert_eq!(record.rank.as_deref(), Some("A"));
    assert_eq!(record.page_ref.as_deref(), Some("③-7"));
    assert_eq!(record.source_page, 2);
}

#[test]
fn kanri_falls_back_to_page_footer_when_index_misses() {
    let doc = FixtureDocument::new(
        vec![],
        vec![
            "【第4章 労務費】\n",
            "例題4-2 賃率差異\n－ ④-11 －\n",
            "例題4-3 索引にも欄外にもない\n",
        ],
    );

    let records = extract_examples(&doc, Subject::Kanri, "kanri.pdf");
    assert_eq!(records.len(), 2);

    // no index entry for 4-2: the page's own footer citation is used
    assert_eq!(records[0].page_ref.as_deref(), Some("④-11"));
    assert_eq!(records[0].rank, None);
    assert_eq!(records[0].chapter_title, "労務費");

    // both the index and the footer miss: absence, not an error
    assert_eq!(records[1].page_ref, None);
}

#[test]
fn unknown_subject_yields_no_records() {
    let doc = FixtureDocument::new(
        vec![(1, "第1章 総論", 1)],
        vec!["例題 1 どの科目でも拾える見出し\n"],
    );

    assert!(extract_examples(&doc, Subject::Unknown, "doc.pdf").is_empty());
}

#[test]
fn extract_over_garbage_bytes_degrades_to_empty() {
    assert!(extract(b"not a pdf", Subject::Zeimu, "broken.pdf").is_empty());
}
