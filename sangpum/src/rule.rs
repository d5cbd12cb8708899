//! 商品名の語の再分類と結合
//!
//! 抽出器が出力した語の並びに対して、次の順に規則を適用します。
//!
//! 1. 種別の付与と、隣接語を結合した辞書語の検出
//! 2. 区切り記号を含む数字の結合と、同種の英字・数字の結合
//! 3. 数字に続く単位の検出
//! 4. 英数字と接続記号の連続からの型番の検出
//! 5. 孤立した記号の除去などの後始末
//!
//! 同じ辞書のもとで、処理済みの並びに再び適用しても結果は変わりません。
mod entry;
mod model;
mod unit;

use std::ops::Range;
use std::sync::{Arc, LazyLock};

use hashbrown::HashSet;
use regex::Regex;

pub use crate::rule::entry::RuleEntry;
pub(crate) use crate::rule::entry::{sort_entries, split_entry};

use crate::analyzer::AnalyzerOption;
use crate::char_window::{CharKey, CharWindow};
use crate::chars::{char_type, is_alpha_num, term_type, TokenType};
use crate::common::{
    contains_char, AVAIL_SYMBOLS, AVAIL_SYMBOLS_INNUMBER, AVAIL_SYMBOLS_STANDALONE, DICT_COMPOUND,
    DICT_SPACE, DICT_STOP, DICT_UNIT, DICT_UNIT_SYNONYM, DICT_USER, MAX_MERGE_PROBE,
};
use crate::dictionary::tag_prob::{PosTag, TagProbDictionary};
use crate::dictionary::{
    CompoundDictionary, DictionarySnapshot, SetDictionary, SpaceDictionary, SynonymDictionary,
};
use crate::extractor::Extractor;

/// 区切り記号を含む数字の形。`1,024`や`3.5`、`16:9`などに一致します。
static PTN_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^((([0-9]{0,3}([,][0-9]{3})*)|([0-9]+))([.][0-9]+)*)([:]((([0-9]{0,3}([,][0-9]{3})*)|([0-9]+))([.][0-9]+)*)){0,1}$",
    )
    .ok()
});

fn is_number_pattern(term: &[char]) -> bool {
    let s: String = term.iter().collect();
    PTN_NUMBER.as_ref().is_some_and(|re| re.is_match(&s))
}

/// 規則の適用器。
///
/// 1回の解析の間だけ使われ、辞書は解析開始時のスナップショットから借ります。
#[derive(Clone, Copy)]
pub struct ParsingRule<'a> {
    system: &'a TagProbDictionary,
    unit: Option<&'a SetDictionary>,
    unit_synonym: Option<&'a SynonymDictionary>,
    space: Option<&'a SpaceDictionary>,
    stop: Option<&'a SetDictionary>,
    user: Option<&'a SetDictionary>,
    compound: Option<&'a CompoundDictionary>,
    option: AnalyzerOption,
    start: usize,
    last_position: usize,
}

impl<'a> ParsingRule<'a> {
    /// 辞書のスナップショットから適用器を生成します。
    ///
    /// 存在しない辞書は空として扱います。
    pub fn new(snapshot: &'a DictionarySnapshot, option: AnalyzerOption) -> Self {
        Self {
            system: snapshot.system(),
            unit: snapshot.set(DICT_UNIT),
            unit_synonym: snapshot.synonym(DICT_UNIT_SYNONYM),
            space: snapshot.space(DICT_SPACE),
            stop: snapshot.set(DICT_STOP),
            user: snapshot.set(DICT_USER),
            compound: snapshot.compound(DICT_COMPOUND),
            option,
            start: 0,
            last_position: 0,
        }
    }

    #[inline(always)]
    pub fn option(&self) -> &AnalyzerOption {
        &self.option
    }

    #[inline(always)]
    pub fn space_dictionary(&self) -> Option<&'a SpaceDictionary> {
        self.space
    }

    #[inline(always)]
    fn in_unit(&self, key: CharKey<'_>) -> bool {
        self.unit.is_some_and(|d| d.contains(key))
    }

    #[inline(always)]
    fn in_user(&self, key: CharKey<'_>) -> bool {
        self.user.is_some_and(|d| d.contains(key))
    }

    #[inline(always)]
    fn in_stop(&self, key: CharKey<'_>) -> bool {
        self.stop.is_some_and(|d| d.contains(key))
    }

    /// システム辞書、利用者辞書、(検索語用では)複合名詞辞書のいずれかにあるか。
    fn contains_dictionary(&self, key: CharKey<'_>) -> bool {
        self.system.find(key).is_some()
            || self.in_user(key)
            || (self.option.for_query() && self.compound.is_some_and(|d| d.contains_key(key)))
    }

    /// 抽出結果の1語を並びに追加します。
    ///
    /// 品詞から種別を決め、分かち書き辞書にある語は断片に分けて、
    /// 断片の間に長さ0の記号を挟みます。
    ///
    /// # 引数
    ///
    /// * `list` - 追加先
    /// * `buf` - 入力の文字バッファ
    /// * `range` - バッファ上の範囲
    /// * `token_type` - 品詞から決まらない場合の種別
    /// * `tag` - 抽出器の品詞
    /// * `offsets` - 入力上の開始・終了オフセット
    /// * `space` - 分かち書き辞書
    pub fn add_entry(
        list: &mut Vec<RuleEntry>,
        buf: &Arc<[char]>,
        range: Range<usize>,
        token_type: Option<TokenType>,
        tag: Option<PosTag>,
        offsets: Range<usize>,
        space: Option<&SpaceDictionary>,
    ) {
        let token_type = if token_type == Some(TokenType::FullString) {
            token_type
        } else {
            match tag {
                Some(PosTag::N) => Some(TokenType::Hangul),
                Some(PosTag::DIGIT) => Some(TokenType::Number),
                Some(PosTag::ALPHA) => Some(TokenType::Alpha),
                Some(PosTag::SYMBOL) => Some(TokenType::Symbol),
                None | Some(PosTag::UNK) => Some(TokenType::Uncategorized),
                _ => token_type,
            }
        };
        let term = buf.get(range.clone()).unwrap_or(&[]);
        let fragments = match (token_type, space) {
            (Some(TokenType::FullString), _) | (_, None) => None,
            (_, Some(space)) => space.get(CharKey::exact(term)),
        };
        let Some(fragments) = fragments else {
            list.push(RuleEntry::new(
                buf.clone(),
                range.start,
                range.len(),
                offsets.start,
                offsets.end,
                token_type,
            ));
            return;
        };
        let mut position = 0;
        for (i, fragment) in fragments.iter().enumerate() {
            let offset = offsets.start + position;
            if i > 0 {
                list.push(RuleEntry::new(
                    buf.clone(),
                    range.start + position,
                    0,
                    offset,
                    offset,
                    Some(TokenType::Symbol),
                ));
            }
            list.push(RuleEntry::new(
                buf.clone(),
                range.start + position,
                fragment.len(),
                offset,
                offset + fragment.len(),
                Some(TokenType::Hangul),
            ));
            position += fragment.len();
        }
    }

    /// 並びの範囲を記録します。[`Self::process`]の前に呼びます。
    pub fn init(&mut self, queue: &[RuleEntry]) {
        if let (Some(first), Some(last)) = (queue.first(), queue.last()) {
            self.start = first.start;
            self.last_position = last.end();
        }
    }

    /// 規則を適用します。
    ///
    /// # 引数
    ///
    /// * `queue` - 語の並び。結果で置き換えられます。
    /// * `full_extract` - 隣接語の辞書照合と副語の生成を行うか
    ///
    /// # 戻り値
    ///
    /// 記号1つだけの並びで処理しなかった場合は偽
    pub fn process(&self, queue: &mut Vec<RuleEntry>, full_extract: bool) -> bool {
        if queue.len() == 1 && queue[0].token_type.is_none() {
            let entry = queue.remove(0);
            split_entry(entry, queue, 0);
        }
        if queue.len() == 1 && queue[0].is_type(TokenType::Symbol) {
            return false;
        }
        sort_entries(queue);

        self.assign_types(queue, full_extract);
        log::trace!("[sangpum] 1st pass: {:?}", queue);
        self.merge_numbers(queue);
        log::trace!("[sangpum] 2nd pass: {:?}", queue);
        self.detect_units(queue, full_extract);
        log::trace!("[sangpum] 3rd pass: {:?}", queue);
        self.detect_model_names(queue, full_extract);
        log::trace!("[sangpum] 4th pass: {:?}", queue);
        self.clean_up(queue);
        self.finish(queue);
        log::trace!("[sangpum] final: {:?}", queue);
        true
    }

    fn assign_types(&self, queue: &mut Vec<RuleEntry>, full_extract: bool) {
        let mut qinx = 0;
        while qinx < queue.len() {
            if queue[qinx].is_type(TokenType::FullString) {
                qinx += 1;
                continue;
            }
            if queue[qinx].is_empty() {
                queue[qinx].modifiable = false;
                if qinx > 0 && qinx + 1 < queue.len() {
                    queue[qinx - 1].modifiable = false;
                    queue[qinx + 1].modifiable = false;
                }
                qinx += 1;
                continue;
            }
            if queue[qinx].is_type(TokenType::Uncategorized) {
                if self.in_user(queue[qinx].key()) {
                    queue[qinx].token_type = Some(TokenType::Hangul);
                } else {
                    let entry = queue.remove(qinx);
                    if split_entry(entry, queue, qinx) == 0 {
                        continue;
                    }
                }
            }
            if full_extract {
                qinx = self.merge_probe(queue, qinx);
            }
            if let Some(next) = self.reclassify(queue, qinx) {
                qinx = next;
                continue;
            }
            if self.fuse_number(queue, qinx) {
                continue;
            }
            qinx += 1;
        }
    }

    /// 後続の最大10語と結合した形が辞書にあれば1語にまとめます。
    ///
    /// 結合した形の前後は空白、入力の端、または異なる文字種別でなければなりません。
    ///
    /// # 戻り値
    ///
    /// 処理を続ける位置
    fn merge_probe(&self, queue: &mut Vec<RuleEntry>, qinx: usize) -> usize {
        enum Probe<'d> {
            Space(&'d [CharWindow]),
            Stop,
            Word,
        }

        let buf = queue[qinx].buf.clone();
        let mut ctype = char_type(queue[qinx].last_char());
        for linx in (1..=MAX_MERGE_PROBE).rev() {
            if qinx + linx >= queue.len() {
                continue;
            }
            let e0 = &queue[qinx];
            let e1 = &queue[qinx + linx];
            if !e0.same_buf(e1) || e1.is_empty() || e1.is_type(TokenType::FullString) {
                continue;
            }
            let tmp_st = e0.start;
            let tmp_ed = e1.end();
            let st_ch = if tmp_st > 0 { e0.char_at(tmp_st - 1) } else { '\0' };
            let ed_ch = if tmp_ed < self.last_position { e0.char_at(tmp_ed) } else { '\0' };
            let st_type = char_type(st_ch);
            let ed_type = char_type(ed_ch);
            let bounded = (tmp_st == 0 || (st_ch != '\0' && (st_ch == ' ' || st_type != ctype)))
                && (tmp_ed == self.last_position || (ed_ch != '\0' && (ed_ch == ' ' || ed_type != ctype)));
            ctype = ed_type;
            if !bounded || tmp_ed <= tmp_st {
                continue;
            }
            let contiguous = (0..linx).all(|t| {
                let prev = &queue[qinx + t];
                let cur = &queue[qinx + t + 1];
                !cur.is_empty() && !cur.is_type(TokenType::FullString) && prev.is_followed_by(cur)
            });
            if !contiguous {
                continue;
            }

            let Some(term) = buf.get(tmp_st..tmp_ed) else {
                continue;
            };
            let key = CharKey::exact(term);
            let probe = if let Some(fragments) = self.space.and_then(|d| d.get(key)) {
                Probe::Space(fragments)
            } else if self.in_stop(key) {
                Probe::Stop
            } else if self.contains_dictionary(key) {
                Probe::Word
            } else {
                continue;
            };

            let mut merged = queue[qinx].clone();
            merged.length = tmp_ed - tmp_st;
            merged.end_offset = queue[qinx + linx].end_offset;
            merged.token_type = Some(TokenType::Hangul);
            queue.drain(qinx..=qinx + linx);
            match probe {
                Probe::Space(fragments) if !fragments.is_empty() => {
                    let mut start = merged.start;
                    let mut offset = merged.start_offset;
                    for (i, fragment) in fragments.iter().enumerate() {
                        let len = fragment.len();
                        let mut e = RuleEntry::new(
                            buf.clone(),
                            start,
                            len,
                            offset,
                            offset + len,
                            Some(TokenType::Hangul),
                        );
                        e.modifiable = false;
                        queue.insert(qinx + i, e);
                        start += len;
                        offset += len;
                    }
                    return qinx + fragments.len() - 1;
                }
                Probe::Stop => {
                    merged.modifiable = false;
                    queue.insert(qinx, merged);
                }
                _ => queue.insert(qinx, merged),
            }
            return qinx;
        }
        qinx
    }

    /// 辞書語の種別を文字の並びから見直します。
    ///
    /// 数字で始まり単位で終わる語は数字と単位に分け、3文字以下の英数字の語は
    /// 英数字に隣接していれば文字種別で分けます。
    ///
    /// # 戻り値
    ///
    /// 処理を続ける位置。見直さなかった場合は`None`
    fn reclassify(&self, queue: &mut Vec<RuleEntry>, qinx: usize) -> Option<usize> {
        let e0 = &queue[qinx];
        if !(e0.is_type(TokenType::Hangul) && e0.modifiable) {
            return None;
        }
        let term = e0.term();
        if char_type(e0.first_char()) == TokenType::Number {
            let mut num_inx = 1;
            let mut number_trans = false;
            while num_inx < term.len() {
                let ch = term[num_inx];
                let in_number = contains_char(AVAIL_SYMBOLS_INNUMBER, ch);
                if in_number {
                    number_trans = true;
                }
                if char_type(ch) != TokenType::Number && !in_number {
                    break;
                }
                num_inx += 1;
            }
            let unit_term = &term[num_inx..];
            if unit_term.is_empty() || !self.in_unit(CharKey::exact(unit_term)) {
                return None;
            }
            let unit_type = term_type(unit_term);
            let mut number = queue[qinx].clone();
            let mut unit = number.clone();
            number.length = num_inx;
            number.end_offset = number.start_offset + num_inx;
            number.token_type = Some(if number_trans {
                TokenType::NumberTrans
            } else {
                TokenType::Number
            });
            unit.start += num_inx;
            unit.length -= num_inx;
            unit.start_offset += num_inx;
            unit.token_type = Some(unit_type);
            queue[qinx] = number;
            queue.insert(qinx + 1, unit);
            return Some(qinx + 2);
        }

        if term.len() > 3 {
            return None;
        }
        if !self.in_user(CharKey::exact(term)) && is_alpha_num(term) {
            let joinable_type = [TokenType::Alpha, TokenType::Number, TokenType::Symbol];
            let mut joinable = qinx > 0 && {
                let e1 = &queue[qinx - 1];
                e1.is_followed_by(e0) && e1.is_any_type(&joinable_type)
            };
            if !joinable && qinx + 1 < queue.len() {
                let e2 = &queue[qinx + 1];
                joinable = e0.is_followed_by(e2) && e2.is_any_type(&joinable_type);
            }
            if joinable {
                let entry = queue.remove(qinx);
                split_entry(entry, queue, qinx);
            }
            return Some(qinx + 1);
        }
        let ty = match term_type(term) {
            TokenType::Alpha => Some(TokenType::Alpha),
            TokenType::Number => Some(TokenType::Number),
            TokenType::Ascii | TokenType::Alphanum => Some(TokenType::ModelName),
            _ => None,
        };
        if ty.is_some() {
            queue[qinx].token_type = ty;
        }
        None
    }

    /// 区切り記号1文字を挟んだ数字の組を1つにまとめます。
    fn fuse_number(&self, queue: &mut Vec<RuleEntry>, qinx: usize) -> bool {
        if qinx + 1 >= queue.len() {
            return false;
        }
        let e0 = &queue[qinx];
        let e1 = &queue[qinx + 1];
        if !(e0.is_any_type(&[TokenType::Number, TokenType::NumberTrans])
            && e1.is_type(TokenType::Number)
            && e0.end_offset != e1.start_offset
            && e0.same_buf(e1)
            && e1.start == e0.end() + 1)
        {
            return false;
        }
        let c = e0.char_at(e0.end());
        if !(char_type(c) == TokenType::Symbol && contains_char(AVAIL_SYMBOLS_INNUMBER, c)) {
            return false;
        }
        let e1 = queue.remove(qinx + 1);
        let e0 = &mut queue[qinx];
        e0.length += 1 + e1.length;
        e0.end_offset = e1.end_offset;
        e0.token_type = Some(TokenType::NumberTrans);
        true
    }

    fn merge_numbers(&self, queue: &mut Vec<RuleEntry>) {
        let number_like = [TokenType::Number, TokenType::NumberTrans];
        let mut qinx = 0;
        while qinx < queue.len() {
            if queue[qinx].is_type(TokenType::FullString) {
                qinx += 1;
                continue;
            }
            if qinx + 2 < queue.len() {
                let (e0, e1, e2) = (&queue[qinx], &queue[qinx + 1], &queue[qinx + 2]);
                if e0.is_any_type(&number_like)
                    && e1.is_type(TokenType::Symbol)
                    && e1.length == 1
                    && e2.is_type(TokenType::Number)
                    && e0.is_followed_by(e1)
                    && e1.is_followed_by(e2)
                    && contains_char(AVAIL_SYMBOLS_INNUMBER, e1.first_char())
                {
                    let length = e0.length + e1.length + e2.length;
                    let matched = e0
                        .buf
                        .get(e0.start..e0.start + length)
                        .is_some_and(is_number_pattern);
                    if matched {
                        let e0 = &mut queue[qinx];
                        e0.length = length;
                        e0.end_offset = e0.start_offset + length;
                        e0.token_type = Some(TokenType::NumberTrans);
                        queue.drain(qinx + 1..qinx + 3);
                        continue;
                    }
                }
            }
            if qinx + 1 < queue.len() {
                let (e0, e1) = (&queue[qinx], &queue[qinx + 1]);
                if e0.is_followed_by(e1) && !e0.is_empty() && !e1.is_empty() {
                    let pair = (e0.token_type, e1.token_type);
                    let same = match pair {
                        (Some(TokenType::Alpha), Some(TokenType::Alpha)) => Some(TokenType::Alpha),
                        (Some(TokenType::Number), Some(TokenType::Number)) => Some(TokenType::Number),
                        _ => None,
                    };
                    if let Some(ty) = same {
                        if let Some(i) = self.merge_queue(queue, qinx + 2, 2, None) {
                            queue[i].token_type = Some(ty);
                            continue;
                        }
                    } else if matches!(
                        pair,
                        (Some(TokenType::Japanese), Some(TokenType::Japanese))
                            | (Some(TokenType::Japanese), Some(TokenType::Chinese))
                            | (Some(TokenType::Chinese), Some(TokenType::Japanese))
                    ) {
                        let e1 = queue.remove(qinx + 1);
                        let e0 = &mut queue[qinx];
                        e0.length += e1.length;
                        e0.end_offset = e1.end_offset;
                        e0.token_type = Some(TokenType::Japanese);
                        continue;
                    }
                }
            }
            qinx += 1;
        }
    }

    #[inline(always)]
    fn is_standalone(entry: &RuleEntry) -> bool {
        entry.length == 1 && contains_char(AVAIL_SYMBOLS_STANDALONE, entry.first_char())
    }

    fn clean_up(&self, queue: &mut Vec<RuleEntry>) {
        let mut qinx = 0;
        while qinx < queue.len() {
            let e0 = &queue[qinx];
            if e0.is_type(TokenType::FullString) || self.in_user(e0.key()) {
                qinx += 1;
                continue;
            }
            if e0.is_empty() {
                queue.remove(qinx);
                continue;
            }
            if e0.is_type(TokenType::Symbol) {
                let standalone = Self::is_standalone(e0);
                let remove = if !contains_char(AVAIL_SYMBOLS, e0.first_char()) {
                    true
                } else if qinx == 0 {
                    qinx + 1 < queue.len() && !standalone
                } else {
                    !standalone
                };
                if remove {
                    queue.remove(qinx);
                    continue;
                }
            }
            let e0 = &mut queue[qinx];
            if e0.is_type(TokenType::ModelName)
                && e0.length > 2
                && char_type(e0.last_char()) == TokenType::Symbol
            {
                e0.length -= 1;
                e0.end_offset -= 1;
            }
            if e0.is_type(TokenType::Number) && e0.length >= 5 {
                e0.token_type = Some(TokenType::ModelName);
            }
            qinx += 1;
        }
    }

    fn finish(&self, queue: &mut Vec<RuleEntry>) {
        for entry in queue.iter_mut() {
            if entry.is_type(TokenType::FullString) {
                continue;
            }
            entry.modifiable = !entry.sub_entries.is_empty();
            if self.option.for_query() || entry.is_type(TokenType::Compound) {
                continue;
            }
            let Some(words) = self.compound.and_then(|d| d.get(entry.key())) else {
                continue;
            };
            let (start_offset, end_offset) = (entry.start_offset, entry.end_offset);
            for word in words {
                entry.sub_entries.push(RuleEntry::from_window(
                    word,
                    start_offset,
                    end_offset,
                    Some(TokenType::Compound),
                ));
            }
            sort_entries(&mut entry.sub_entries);
            entry.token_type = Some(TokenType::Compound);
        }

        if queue.len() > 1
            && queue[0].is_type(TokenType::FullString)
            && queue[1].start_offset == queue[0].start_offset
            && queue[1].end_offset == queue[0].end_offset
        {
            let full = queue.remove(0);
            queue[0].synonyms.extend(full.synonyms);
        }
    }

    /// 同義語を語に分けて規則を適用し直し、空白で連結した形を返します。
    ///
    /// # 引数
    ///
    /// * `extractor` - 語分割器
    /// * `synonyms` - 辞書から得た同義語
    /// * `entry` - 同義語を持つ語。オフセットの基準になります。
    ///
    /// # 戻り値
    ///
    /// 重複を除いた同義語の列
    pub fn synonym_extract(
        &self,
        extractor: &mut Extractor,
        synonyms: &[CharWindow],
        entry: &RuleEntry,
    ) -> Vec<String> {
        let sub_rule = ParsingRule {
            option: self.option.use_synonym(false).use_stopword(true),
            start: 0,
            last_position: 0,
            ..*self
        };
        let mut result = vec![];
        let mut seen = HashSet::new();
        for synonym in synonyms {
            let mut words: Vec<String> = vec![];
            for token in synonym.split_by_whitespace() {
                let buf = token.buffer();
                let range = token.offset()..token.offset() + token.len();
                let chars = token.as_chars();
                let mut list = vec![];
                for segment in extractor.extract(self.system, buf, range.clone()) {
                    if segment.len() < range.len() {
                        let piece = CharWindow::new(buf.clone(), segment.offset(), segment.len(), false).trim();
                        if piece.is_empty() {
                            continue;
                        }
                        let piece_range = piece.offset()..piece.offset() + piece.len();
                        Self::add_entry(
                            &mut list,
                            buf,
                            piece_range,
                            Some(term_type(piece.as_chars())),
                            Some(segment.tag()),
                            entry.range(),
                            self.space,
                        );
                    } else {
                        Self::add_entry(
                            &mut list,
                            buf,
                            range.clone(),
                            Some(term_type(chars)),
                            Some(segment.tag()),
                            entry.range(),
                            self.space,
                        );
                        break;
                    }
                }
                if list.is_empty() {
                    continue;
                }
                let mut sub_rule = sub_rule;
                sub_rule.init(&list);
                sub_rule.process(&mut list, false);
                words.extend(list.iter().map(RuleEntry::surface));
            }
            let joined = words.join(" ");
            if !joined.is_empty() && seen.insert(joined.clone()) {
                result.push(joined);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests;
