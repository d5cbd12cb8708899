//! 数字に続く単位の検出

use crate::char_window::CharKey;
use crate::chars::{char_type, term_type, uni_type, TokenType};
use crate::common::{MAX_UNIT_LENGTH, MAX_UNIT_PROBE};
use crate::rule::{ParsingRule, RuleEntry};

const NUMBER_LIKE: [TokenType; 2] = [TokenType::Number, TokenType::NumberTrans];

const DIMENSION_LEFT: [TokenType; 4] = [
    TokenType::Number,
    TokenType::NumberTrans,
    TokenType::Unit,
    TokenType::UnitAlpha,
];

#[inline(always)]
fn is_x(ch: char) -> bool {
    ch.eq_ignore_ascii_case(&'x')
}

impl ParsingRule<'_> {
    /// 単位辞書から候補に一致する単位の長さを返します。
    ///
    /// 英字と記号の候補は先頭から最も長く一致する部分を探し、
    /// それ以外は候補全体が一致する場合のみ受け付けます。
    pub(crate) fn find_unit(&self, candidate: &[char], ty: TokenType) -> Option<usize> {
        if matches!(ty, TokenType::Alpha | TokenType::Symbol) {
            let max = candidate.len().min(MAX_UNIT_LENGTH);
            (1..=max)
                .rev()
                .find(|&len| self.in_unit(CharKey::exact(&candidate[..len])))
        } else if !candidate.is_empty() && self.in_unit(CharKey::exact(candidate)) {
            Some(candidate.len())
        } else {
            None
        }
    }

    pub(crate) fn detect_units(&self, queue: &mut Vec<RuleEntry>, full_extract: bool) {
        let mut qinx = 0;
        while qinx < queue.len() {
            if queue[qinx].is_type(TokenType::FullString) {
                qinx += 1;
                continue;
            }
            if qinx + 1 < queue.len()
                && queue[qinx].is_followed_by(&queue[qinx + 1])
                && queue[qinx].is_any_type(&NUMBER_LIKE)
            {
                self.apply_unit(queue, qinx, full_extract);
            }
            qinx += 1;
        }
    }

    fn apply_unit(&self, queue: &mut Vec<RuleEntry>, qinx: usize, full_extract: bool) {
        let e1 = &queue[qinx + 1];

        // Probe up to five following entries, longest first.
        let mut found: Option<(usize, usize)> = None;
        for find_inx in (1..=MAX_UNIT_PROBE).rev() {
            let Some(e2) = queue.get(qinx + find_inx) else {
                continue;
            };
            if e2.is_empty() || (find_inx > 1 && e2.is_type(TokenType::Hangul)) {
                continue;
            }
            let unit_length = if e2.same_buf(e1) {
                e2.end().saturating_sub(e1.start)
            } else {
                e1.length
            };
            if unit_length == 0 || unit_length > MAX_UNIT_LENGTH {
                continue;
            }
            let Some(candidate) = e1.buf.get(e1.start..e1.start + unit_length) else {
                continue;
            };
            if let Some(len) = self.find_unit(candidate, uni_type(candidate)) {
                found = Some((find_inx, len));
                break;
            }
        }
        let Some((find_inx, cand_len)) = found else {
            return;
        };

        let e0 = &queue[qinx];
        let candidate: Vec<char> = e1
            .buf
            .get(e1.start..e1.start + cand_len)
            .map(<[char]>::to_vec)
            .unwrap_or_default();
        let unit_type = uni_type(&candidate);

        let mut before = if e0.start > self.start {
            e0.char_at(e0.start - 1)
        } else {
            '\0'
        };
        // "2x3cm": the x belongs to a dimension, not to a model name.
        if is_x(before) && qinx > 1 {
            let (e3, e2) = (&queue[qinx - 2], &queue[qinx - 1]);
            if e2.length == 1
                && e3.is_followed_by(e2)
                && e2.is_followed_by(e0)
                && e3.is_any_type(&DIMENSION_LEFT)
            {
                before = '\0';
            }
        }
        let type_prev = qinx.checked_sub(1).and_then(|i| queue[i].token_type);
        let alpha_unit = unit_type == TokenType::Alpha;

        let exact = (find_inx == 1 && cand_len == e1.length)
            || (find_inx > 1
                && queue[qinx + find_inx].end_offset.checked_sub(e1.start_offset) == Some(cand_len));
        if exact {
            let prev_is_unit = matches!(type_prev, Some(TokenType::Unit | TokenType::UnitAlpha));
            if (alpha_unit && prev_is_unit) || !(char_type(before) == TokenType::Alpha && alpha_unit) {
                self.modify_rule_entry(full_extract, &mut queue[qinx], &candidate, unit_type);
                queue.drain(qinx + 1..=qinx + find_inx);
            }
            return;
        }

        let Some(&after) = e1.buf.get(e1.start + cand_len) else {
            return;
        };
        let x_next = queue
            .get(qinx + 2)
            .filter(|e3| e1.is_followed_by(e3))
            .map_or('\0', RuleEntry::first_char);
        if (char_type(before) == TokenType::Alpha || char_type(after) == TokenType::Alpha)
            && !is_x(after)
            && alpha_unit
            && char_type(x_next) != TokenType::Number
        {
            // Looks like a model name rather than a unit.
            queue[qinx].modifiable = true;
            queue[qinx + 1].modifiable = true;
            return;
        }

        let head = e1.clone();
        let consumed_end = queue[qinx + find_inx].end();
        self.modify_rule_entry(full_extract, &mut queue[qinx], &candidate, unit_type);
        queue.drain(qinx + 1..=qinx + find_inx);

        let rest_start = head.start + cand_len;
        if consumed_end > rest_start {
            let length = consumed_end - rest_start;
            let start_offset = head.start_offset + cand_len;
            let mut rest = RuleEntry::new(
                head.buf.clone(),
                rest_start,
                length,
                start_offset,
                start_offset + length,
                None,
            );
            rest.token_type = Some(term_type(rest.term()));
            queue.insert(qinx + 1, rest);
        }
    }

    /// 数字の語を単位まで伸ばし、単位付きの種別に変えます。
    ///
    /// 全体抽出では元の数字を副語として残し、区切り記号を含む数字には
    /// 区切り記号を除いた形の単位語も副語として加えます。
    /// 検索語用では単位の同義語から数字付きの同義語を作ります。
    pub(crate) fn modify_rule_entry(
        &self,
        full_extract: bool,
        e0: &mut RuleEntry,
        candidate: &[char],
        unit_type: TokenType,
    ) {
        let backup = e0.clone();
        let unit_str: String = candidate.iter().collect();
        if full_extract {
            e0.sub_entries = vec![backup.clone()];
        }

        let mut units: Vec<String> = vec![];
        let mut synonyms: Vec<String> = vec![];
        if full_extract && self.option.for_query() {
            if let Some(list) = self.unit_synonym.and_then(|d| d.get(CharKey::exact(candidate))) {
                units = list.iter().map(ToString::to_string).collect();
                let only_self = units.len() == 1 && units[0].to_lowercase() == unit_str.to_lowercase();
                if !only_self {
                    let number = e0.surface();
                    synonyms = units.iter().map(|u| format!("{number}{u}")).collect();
                }
            }
        }

        if e0.is_type(TokenType::NumberTrans) {
            let number: String = e0.surface().chars().filter(|&c| c != ',').collect();
            if backup.length != number.chars().count() {
                let term = format!("{number}{unit_str}");
                let mut e1 = RuleEntry::from_str(
                    &term,
                    e0.start_offset,
                    e0.end_offset + candidate.len(),
                    Some(TokenType::Unit),
                );
                if self.option.synonym() {
                    e1.synonyms = units.iter().map(|u| format!("{number}{u}")).collect();
                }
                e0.sub_entries.insert(0, e1);
            }
        }
        if full_extract && !synonyms.is_empty() {
            e0.synonyms = synonyms;
        }
        e0.length += candidate.len();
        e0.end_offset += candidate.len();
        e0.token_type = Some(if unit_type == TokenType::Alpha {
            TokenType::UnitAlpha
        } else {
            TokenType::Unit
        });
    }
}
