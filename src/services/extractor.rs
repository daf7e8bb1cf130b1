//! 候选帖子提取 - 业务能力层
//!
//! 把一次子树插入事件变成零个或多个帖子。提取本身是纯函数，
//! 入队（查账本、记账本、入队）由 `admit` 完成。

use crate::models::{extract_status_id, ContentUnit, InsertedSubtree, PageLocation};
use crate::services::{DeduplicationLedger, WorkQueue};

/// 推广帖识别
///
/// 可替换的分类步骤；默认实现基于界面文案，受语言和改版影响
pub trait SponsorshipClassifier: Send + Sync {
    fn is_sponsored(&self, inner_text: &str) -> bool;
}

/// 基于文案标记的推广识别
///
/// - `substrings`: 出现在文本任意位置即判定
/// - `labels`: 独占一行时判定（`Ad` 这类短标签做子串匹配会误伤正文）
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    substrings: Vec<String>,
    labels: Vec<String>,
}

impl MarkerClassifier {
    pub fn new(substrings: Vec<String>, labels: Vec<String>) -> Self {
        Self { substrings, labels }
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self {
            substrings: vec!["Promoted".to_string(), "推广".to_string()],
            labels: vec!["Ad".to_string(), "广告".to_string()],
        }
    }
}

impl SponsorshipClassifier for MarkerClassifier {
    fn is_sponsored(&self, inner_text: &str) -> bool {
        self.substrings.iter().any(|m| inner_text.contains(m.as_str()))
            || inner_text
                .lines()
                .map(str::trim)
                .any(|line| self.labels.iter().any(|label| label == line))
    }
}

/// 候选帖子提取器
pub struct CandidateExtractor {
    classifier: Box<dyn SponsorshipClassifier>,
}

impl CandidateExtractor {
    pub fn new(classifier: impl SponsorshipClassifier + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
        }
    }

    /// 从一次插入事件中提取帖子
    ///
    /// 惰性产出；没有可用 permalink 的节点被静默丢弃
    pub fn extract<'a>(
        &'a self,
        subtree: &'a InsertedSubtree,
        location: &'a PageLocation,
    ) -> impl Iterator<Item = ContentUnit> + 'a {
        subtree.candidates.iter().filter_map(move |raw| {
            let id = raw.permalink.as_deref().and_then(extract_status_id)?;
            Some(ContentUnit {
                is_sponsored: self.classifier.is_sponsored(&raw.inner_text),
                is_detail_view_subject: location.is_detail_subject(&id),
                id,
                handle: raw.handle.clone(),
                text: raw.text.clone(),
            })
        })
    }
}

impl Default for CandidateExtractor {
    fn default() -> Self {
        Self::new(MarkerClassifier::default())
    }
}

/// 入队判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    AlreadySeen,
    Sponsored,
    DetailViewSubject,
}

/// 入队：已见过则跳过；否则记入账本，合格的才进入队列
pub fn admit(
    unit: ContentUnit,
    ledger: &mut DeduplicationLedger,
    queue: &mut WorkQueue,
) -> Admission {
    if ledger.has(&unit.id) {
        return Admission::AlreadySeen;
    }
    ledger.add(unit.id.clone());

    if !unit.is_eligible() {
        return if unit.is_sponsored {
            Admission::Sponsored
        } else {
            Admission::DetailViewSubject
        };
    }
    queue.push(unit);
    Admission::Queued
}
