// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use scraper::Html;

/// 评分上限
pub const MAX_SCORE: f64 = 10.0;

/// 每次提及的得分
const SCORE_PER_MENTION: f64 = 0.2;

/// 不计入可见文本的非内容元素
const NON_CONTENT_ELEMENTS: [&str; 8] = [
    "script", "style", "meta", "link", "noscript", "header", "footer", "nav",
];

/// 提及计数与评分器
///
/// 从渲染文本中统计关键词的整词出现次数，并将累计提及数
/// 映射为[0.0, 10.0]内的评分
pub struct MentionScorer {
    keyword_pattern: Regex,
}

impl MentionScorer {
    /// 创建新的评分器实例
    ///
    /// # 参数
    ///
    /// * `keyword` - 目标关键词，匹配不区分大小写且按整词边界进行
    pub fn new(keyword: &str) -> Self {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
        Self {
            // Escaped literal keyword, the pattern always compiles
            keyword_pattern: Regex::new(&pattern).unwrap(),
        }
    }

    /// 统计HTML文档中关键词的提及次数
    ///
    /// 先整体移除script/style/meta/link/noscript/header/footer/nav
    /// 子树，再在剩余可见文本上计数
    pub fn count_mentions(&self, html: &str) -> u32 {
        let document = Html::parse_document(html);
        let text = visible_text(&document);
        self.keyword_pattern.find_iter(&text).count() as u32
    }

    /// 将累计提及数映射为评分
    ///
    /// `min(10.0, round(mentions * 0.2, 1))`，一位小数舍入是
    /// 契约的一部分
    pub fn score_of(&self, mentions: u32) -> f64 {
        let raw = (mentions as f64 * SCORE_PER_MENTION * 10.0).round() / 10.0;
        raw.min(MAX_SCORE)
    }
}

/// 提取文档的可见文本
///
/// 跳过祖先链中含有任一非内容元素的文本节点
fn visible_text(document: &Html) -> String {
    let mut text = String::new();
    for node in document.tree.root().descendants() {
        if let Some(fragment) = node.value().as_text() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| NON_CONTENT_ELEMENTS.contains(&element.name()))
            });
            if !hidden {
                text.push_str(&fragment.text);
                text.push(' ');
            }
        }
    }
    text
}
