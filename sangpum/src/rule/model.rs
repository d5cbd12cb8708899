//! 型番の検出
//!
//! 英数字と接続記号が隙間なく続く区間を1つの[`TokenType::ModelName`]にまとめます。
//! 全体抽出では、まとめる前の部分語を整理して副語として残します。

use std::sync::Arc;

use crate::chars::{char_type, term_type, TokenType};
use crate::common::{contains_char, AVAIL_SYMBOLS_CONNECTOR};
use crate::rule::{sort_entries, ParsingRule, RuleEntry};

const ALNUM: [TokenType; 2] = [TokenType::Alpha, TokenType::Number];

const ALNUM_LIKE: [TokenType; 3] = [TokenType::Alpha, TokenType::Number, TokenType::NumberTrans];

const NUMBER_OR_UNIT: [TokenType; 4] = [
    TokenType::Number,
    TokenType::NumberTrans,
    TokenType::Unit,
    TokenType::UnitAlpha,
];

#[inline(always)]
fn is_alnum_type(ty: TokenType) -> bool {
    matches!(ty, TokenType::Alpha | TokenType::Number)
}

#[inline(always)]
fn is_connector(entry: &RuleEntry) -> bool {
    contains_char(AVAIL_SYMBOLS_CONNECTOR, entry.first_char())
}

/// 英数字が隣接して1つの型番になり得るかの状態。
struct Continuity {
    cont: isize,
    cont_merge: isize,
    over_index: isize,
    is_continue: bool,
    is_alnum: bool,
}

impl ParsingRule<'_> {
    pub(crate) fn detect_model_names(&self, queue: &mut Vec<RuleEntry>, full_extract: bool) {
        let mut state = Continuity {
            cont: 0,
            cont_merge: 0,
            over_index: 0,
            is_continue: false,
            is_alnum: false,
        };
        let mut ty: Option<TokenType> = None;
        let mut qinx: isize = 0;
        while (qinx as usize) < queue.len() {
            let i = qinx as usize;
            let type_prev = ty;
            {
                let e0 = &mut queue[i];
                if !e0.is_type(TokenType::FullString)
                    && char_type(e0.first_char()) == TokenType::Alpha
                    && term_type(e0.term()) == TokenType::Alpha
                {
                    e0.token_type = Some(TokenType::Alpha);
                }
                ty = e0.token_type;
            }

            state.is_continue = true;
            state.cont_merge = 0;
            state.over_index = 0;
            let is_alnum_prev = state.is_alnum;
            state.is_alnum = queue[i].is_any_type(&ALNUM_LIKE);

            if state.is_alnum || matches!(ty, Some(TokenType::Symbol | TokenType::UnitAlpha)) {
                if i > 0 {
                    let (e1, e0) = (&queue[i - 1], &queue[i]);
                    let connected = e1.is_followed_by(e0)
                        && Self::connects(e0, e1, ty, is_alnum_prev, state.cont);
                    if e0.is_empty() || e1.is_empty() || !connected {
                        state.cont_merge = state.cont;
                        state.cont = 0;
                        state.is_continue = false;
                    } else {
                        state.cont += 1;
                    }
                }
            } else {
                state.cont_merge = state.cont;
                state.cont = 0;
                state.is_continue = false;
            }

            // Exceptions that cancel a merge right before it happens.
            let e0_len = queue[i].length;
            let e0_char = queue[i].first_char();
            if ty == Some(TokenType::UnitAlpha) && type_prev == Some(TokenType::UnitAlpha) && i > 0 {
                if queue[i - 1].is_followed_by(&queue[i]) {
                    // Two adjacent units, not a model name.
                    queue[i].modifiable = false;
                    queue[i - 1].modifiable = false;
                    state.cont = 0;
                    state.cont_merge = 0;
                    state.is_continue = true;
                } else {
                    state.is_continue = false;
                }
            } else if ty == Some(TokenType::Alpha) && e0_len == 1 && e0_char.eq_ignore_ascii_case(&'x') {
                if let Some(next) = self.detach_dimension(queue, i, &mut state) {
                    qinx = next as isize;
                }
            } else if ty == Some(TokenType::Symbol) && e0_len == 1 {
                if i > 0 && i + 1 < queue.len() {
                    let adjacent = queue[i - 1].is_followed_by(&queue[i]) && queue[i].is_followed_by(&queue[i + 1]);
                    if e0_char == '/' {
                        if adjacent
                            && queue[i - 1].is_type(TokenType::Number)
                            && queue[i + 1].is_type(TokenType::Number)
                            && state.cont < 2
                        {
                            // A slash between two plain numbers is dropped.
                            queue[i - 1].modifiable = false;
                            queue[i + 1].modifiable = false;
                            queue.remove(i);
                            state.cont = 0;
                            state.cont_merge = 0;
                            state.is_continue = false;
                            qinx -= 1;
                        }
                    } else if e0_char == '+' && adjacent {
                        if state.is_continue && state.cont != 0 && state.cont_merge == 0 {
                            queue[i - 1].modifiable = false;
                            queue[i + 1].modifiable = false;
                            state.cont_merge = state.cont;
                            state.cont = 0;
                            state.is_continue = false;
                        }
                        state.over_index = 1;
                    }
                }
            } else if ty == Some(TokenType::UnitAlpha) {
                let e1 = i.checked_sub(1).map(|p| &queue[p]);
                let e2 = queue.get(i + 1);
                let e0 = &queue[i];
                match (e1, e2) {
                    (Some(e1), _) if !e1.is_followed_by(e0) => {
                        state.cont = 0;
                        state.is_continue = false;
                    }
                    (Some(e1), Some(e2))
                        if (e1.is_type(TokenType::Symbol) && !e2.is_any_type(&ALNUM))
                            || (e2.is_type(TokenType::Symbol) && !e1.is_any_type(&ALNUM)) =>
                    {
                        if !(e1.first_char() == '-' || e2.first_char() == '-') {
                            // A unit between symbols stays a unit.
                            queue[i].modifiable = false;
                            if state.cont > 0 {
                                state.cont_merge = state.cont - 1;
                                state.cont = 0;
                                state.is_continue = false;
                            } else {
                                state.cont = 0;
                                state.is_continue = true;
                            }
                        } else {
                            state.is_continue = false;
                        }
                    }
                    _ => {}
                }
            }

            if state.is_continue {
                qinx += 1;
                continue;
            }
            if state.cont_merge > 0 {
                state.cont_merge += 1;
                let cur = qinx.max(0) as usize;
                // The trailing symbol is dropped.
                if ty == Some(TokenType::Symbol) && cur < queue.len() && queue[cur].is_type(TokenType::Symbol) {
                    queue.remove(cur);
                }
                if state.cont_merge > 1 {
                    let merged = self.merge_model(queue, cur, state.cont_merge as usize, full_extract);
                    if merged {
                        qinx -= state.cont_merge;
                        qinx -= state.over_index;
                    }
                }
            }
            state.cont_merge = 0;
            qinx = qinx.max(-1) + 1;
        }

        if state.cont > 0 && state.cont_merge == 0 {
            state.cont_merge = state.cont;
        }
        if state.cont_merge > 0 {
            state.cont_merge += 1;
            if ty == Some(TokenType::Symbol) && queue.last().is_some_and(|e| e.is_type(TokenType::Symbol)) {
                queue.pop();
                state.cont_merge -= 1;
            }
            if state.cont_merge > 1 {
                let end = queue.len();
                self.merge_model(queue, end, state.cont_merge as usize, full_extract);
            }
        }
    }

    /// 直前の語から現在の語へ型番として続くかを判定します。
    fn connects(e0: &RuleEntry, e1: &RuleEntry, ty: Option<TokenType>, is_alnum_prev: bool, cont: isize) -> bool {
        let symbol = ty == Some(TokenType::Symbol);
        let prev_unit_alpha = e1.is_type(TokenType::UnitAlpha);
        (!symbol && (is_alnum_prev || prev_unit_alpha || (e1.is_type(TokenType::Symbol) && cont > 0)))
            || (symbol
                && (is_alnum_prev || (prev_unit_alpha && cont > 0))
                && e0.length == 1
                && is_connector(e0))
            || (ty == Some(TokenType::UnitAlpha) && e1.length == 1 && e1.first_char() == '-')
            || (symbol && (is_alnum_prev || (prev_unit_alpha && cont >= 0)) && e0.length == 1 && e0.first_char() == '-')
    }

    /// 数字と単位に挟まれた`x`を寸法の区切りとみなして取り除きます。
    ///
    /// `120x60cm`は`120`と`60cm`に分かれますが、前後に英数字が続く
    /// `118X71WXU3`のような形は型番として残します。
    ///
    /// # 戻り値
    ///
    /// `x`を取り除いた場合は処理を続ける位置
    fn detach_dimension(&self, queue: &mut Vec<RuleEntry>, qinx: usize, state: &mut Continuity) -> Option<usize> {
        if qinx == 0 || qinx + 1 >= queue.len() {
            return None;
        }
        let (e1, e0, e2) = (&queue[qinx - 1], &queue[qinx], &queue[qinx + 1]);
        if !(e1.is_followed_by(e0)
            && e0.is_followed_by(e2)
            && e1.is_any_type(&NUMBER_OR_UNIT)
            && e2.is_any_type(&[TokenType::Unit, TokenType::UnitAlpha]))
        {
            return None;
        }

        // Skip over a chain like 10x20x30.
        let mut xinx = qinx + 2;
        while xinx + 1 < queue.len() {
            if queue[xinx - 1].is_any_type(&NUMBER_OR_UNIT) && queue[xinx + 1].is_any_type(&NUMBER_OR_UNIT) {
                xinx += 2;
            } else {
                break;
            }
        }
        xinx -= 1;

        let alnum_or_connector = |e: &RuleEntry| {
            e.is_any_type(&ALNUM_LIKE) || (e.is_type(TokenType::Symbol) && is_connector(e))
        };
        let mut attached = false;
        if xinx + 1 < queue.len() {
            let (e3, e4) = (&queue[xinx], &queue[xinx + 1]);
            attached = e3.is_followed_by(e4) && alnum_or_connector(e4);
        }
        if !attached && qinx > 2 {
            let (e3, e4) = (&queue[qinx - 2], &queue[qinx - 1]);
            attached = e3.is_followed_by(e4) && alnum_or_connector(e3);
        }
        if attached {
            return None;
        }

        let mut rinx = xinx as isize - 1;
        while rinx >= qinx as isize {
            let r = rinx as usize;
            if r > 1 {
                queue[r - 1].modifiable = false;
            }
            queue.remove(r);
            xinx -= 1;
            rinx -= 2;
        }
        state.cont_merge = state.cont - 1;
        state.cont = 0;
        state.is_continue = false;
        Some(xinx)
    }

    /// `qinx`の直前`cont`語をまとめて型番にします。
    fn merge_model(&self, queue: &mut Vec<RuleEntry>, qinx: usize, cont: usize, full_extract: bool) -> bool {
        let mut sub = if full_extract { Some(vec![]) } else { None };
        let Some(index) = self.merge_queue(queue, qinx, cont, sub.as_mut()) else {
            return false;
        };
        let entry = &mut queue[index];
        if entry.token_type.is_none() {
            entry.token_type = Some(TokenType::ModelName);
        }
        if let Some(mut sub) = sub {
            self.merge_sub_queue(entry, &mut sub);
            if sub.len() > 1 {
                entry.sub_entries = sub;
            }
        }
        true
    }

    /// `qinx`の直前`cont`語を1語にまとめます。
    ///
    /// 種別がすべて同じならその種別を、そうでなければ`None`を持ちます。
    /// `sub`が与えられた場合、まとめた語を部分語として積みます。
    ///
    /// # 戻り値
    ///
    /// まとめた語の位置。まとめる語が1つ以下なら`None`
    pub(crate) fn merge_queue(
        &self,
        queue: &mut Vec<RuleEntry>,
        qinx: usize,
        cont: usize,
        mut sub: Option<&mut Vec<RuleEntry>>,
    ) -> Option<usize> {
        let mut cont = cont;
        let remove_inx = match qinx.checked_sub(cont) {
            Some(i) => i,
            None => {
                cont = cont.saturating_sub(1);
                0
            }
        };
        if cont == 0 || remove_inx + cont > queue.len() {
            return None;
        }
        if queue[remove_inx + cont - 1].is_type(TokenType::Symbol) {
            cont -= 1;
        }
        if cont <= 1 {
            return None;
        }

        let mut entry = queue[remove_inx].clone();
        if entry.is_type(TokenType::UnitAlpha) {
            entry.synonyms.clear();
        }
        entry.length = 0;
        entry.end_offset = entry.start_offset;
        let mut ty = entry.token_type;
        while cont > 0 && remove_inx < queue.len() {
            let mut piece = queue.remove(remove_inx);
            if ty != piece.token_type {
                ty = None;
            }
            if let Some(sub) = sub.as_deref_mut() {
                if piece.is_type(TokenType::UnitAlpha) {
                    let number = piece
                        .sub_entries
                        .iter()
                        .position(|e| e.is_any_type(&[TokenType::Number, TokenType::NumberTrans]));
                    if let Some(n) = number {
                        // Unit turned model name: split the number off again.
                        let number = piece.sub_entries.remove(n);
                        piece.start += number.length;
                        piece.length -= number.length;
                        piece.start_offset += number.length;
                        piece.token_type = Some(TokenType::Alpha);
                        if let Some(next) = queue.get(remove_inx) {
                            if next.is_type(TokenType::Alpha) && next.start_offset == piece.end_offset {
                                // 118X71WXU3: 71W + XU becomes 71 + WXU.
                                let next = queue.remove(remove_inx);
                                piece.length += next.length;
                                piece.end_offset += next.length;
                                cont -= 1;
                            }
                        }
                        sub.push(number);
                    } else {
                        piece.token_type = Some(TokenType::Alphanum);
                    }
                    piece.synonyms.clear();
                }
                entry.length = piece.end() - entry.start;
                entry.end_offset = piece.end_offset;
                sub.push(piece);
            } else {
                entry.length = piece.end() - entry.start;
                entry.end_offset = piece.end_offset;
            }
            cont = cont.saturating_sub(1);
        }
        entry.token_type = ty;
        queue.insert(remove_inx, entry);
        Some(remove_inx)
    }

    /// 型番の部分語を整理します。
    ///
    /// 1文字ずつの英数字の並びをつなぎ直し、記号を取り除き、
    /// 索引用では記号を除いて連結した形も加えます。
    pub(crate) fn merge_sub_queue(&self, entry: &mut RuleEntry, sub: &mut Vec<RuleEntry>) {
        if !entry.is_type(TokenType::ModelName) {
            return;
        }
        if !Self::shrink_small_model(entry, sub) {
            Self::shrink_two_or_three(entry, sub);
        }
        Self::glue_interleaved(sub);
        Self::glue_alpha_digit(sub);
        let extra = self.drop_symbols(sub);
        sub.extend(extra);
        sort_entries(sub);
    }

    /// 3語が連続する短い型番を扱います。処理した場合は真を返します。
    fn shrink_small_model(entry: &mut RuleEntry, sub: &mut Vec<RuleEntry>) -> bool {
        if sub.len() != 3 {
            return false;
        }
        let contiguous = sub
            .windows(2)
            .all(|w| w[0].start_offset + w[0].length == w[1].start_offset);
        if !contiguous {
            return false;
        }
        let total: usize = sub.iter().map(|e| e.length).sum();
        let head = &sub[0];
        let types: Vec<TokenType> = (0..total).map(|k| char_type(head.char_at(head.start + k))).collect();
        match types.as_slice() {
            [t1, t2] => {
                if is_alnum_type(*t1) && *t2 == TokenType::Symbol {
                    entry.length -= 1;
                    entry.end_offset -= 1;
                    entry.token_type = Some(*t1);
                } else if *t1 == TokenType::Symbol && is_alnum_type(*t2) {
                    entry.start += 1;
                    entry.start_offset += 1;
                    entry.length -= 1;
                    entry.token_type = Some(*t2);
                } else if !(t1 != t2 && is_alnum_type(*t1) && is_alnum_type(*t2)) {
                    return false;
                }
                sub.clear();
                true
            }
            [t1, t2, t3] => {
                let all_alnum = is_alnum_type(*t1) && is_alnum_type(*t2) && is_alnum_type(*t3);
                if (is_alnum_type(*t1) && *t2 == TokenType::Symbol && is_alnum_type(*t3))
                    || (t1 != t2 && t2 != t3 && all_alnum)
                {
                    sub.clear();
                }
                true
            }
            _ => false,
        }
    }

    fn shrink_two_or_three(entry: &mut RuleEntry, sub: &mut Vec<RuleEntry>) {
        if sub.len() == 2 {
            let (e0, e1) = (&sub[0], &sub[1]);
            if e0.length == 1 && e1.length == 1 {
                sub.clear();
            } else if e0.is_type(TokenType::Symbol) {
                entry.start += e0.length;
                entry.start_offset += e0.length;
                entry.length -= e0.length;
                entry.token_type = e1.token_type;
            } else if e1.is_type(TokenType::Symbol) {
                entry.length -= e1.length;
                entry.end_offset -= e1.length;
                entry.token_type = e0.token_type;
            }
        } else if sub.len() == 3 {
            let (e0, e1, e2) = (&sub[0], &sub[1], &sub[2]);
            if !(e0.length == 1 && e1.length == 1 && e2.length == 1) {
                return;
            }
            if !(e0.is_any_type(&ALNUM) && e2.is_any_type(&ALNUM)) {
                return;
            }
            if e1.is_type(TokenType::Symbol) {
                if e1.first_char() != '+' {
                    sub.clear();
                }
            } else if e0.token_type == e2.token_type {
                let (len, end_offset) = (e1.length + e2.length, e2.end_offset);
                sub.truncate(1);
                sub[0].length += len;
                sub[0].end_offset = end_offset;
            }
        }
    }

    /// 記号に接する1文字ずつの英数字の並びを1語につなぎます。
    fn glue_interleaved(sub: &mut Vec<RuleEntry>) {
        let single_alnum = |e: &RuleEntry| e.length == 1 && e.is_any_type(&ALNUM);
        let single_symbol = |e: &RuleEntry| e.length == 1 && e.is_type(TokenType::Symbol);

        let mut continuous = 0;
        let mut inx = 0;
        while inx <= sub.len() {
            if sub.get(inx).is_some_and(single_alnum) {
                continuous += 1;
                inx += 1;
                continue;
            }
            if continuous > 1 {
                let pos = inx - continuous;
                let front = pos > 0 && single_symbol(&sub[pos - 1]);
                let rear = inx < sub.len() && single_symbol(&sub[inx]);
                if (pos == 0 && rear) || (front && inx == sub.len()) || (front && rear) {
                    let mut glued = sub[pos].clone();
                    glued.length += continuous - 1;
                    let mut kept = continuous;
                    if continuous < 3 {
                        glued.sub_entries.extend(sub.drain(pos..pos + continuous));
                        inx -= continuous;
                        kept = 0;
                    }
                    glued.token_type = Some(TokenType::Alphanum);
                    glued.end_offset += glued.length - 1;
                    if front {
                        sub.insert(pos + kept, glued);
                    } else {
                        sub.insert(pos, glued);
                    }
                    inx -= kept;
                }
            }
            continuous = 0;
            inx += 1;
        }
    }

    /// 記号に挟まれた英字1文字と数字1文字をつなぎます。
    fn glue_alpha_digit(sub: &mut Vec<RuleEntry>) {
        let mut inx = 0;
        while inx + 1 < sub.len() {
            let (e1, e2) = (&sub[inx], &sub[inx + 1]);
            let front_ok = inx == 0 || {
                let e3 = &sub[inx - 1];
                e3.is_type(TokenType::Symbol) && e3.is_followed_by(e1)
            };
            let rear_ok = sub
                .get(inx + 2)
                .is_none_or(|e4| e4.is_type(TokenType::Symbol) && e2.is_followed_by(e4));
            if front_ok
                && rear_ok
                && e1.is_type(TokenType::Alpha)
                && e2.is_type(TokenType::Number)
                && e1.is_followed_by(e2)
                && e1.length == 1
                && e2.length == 1
            {
                let end_offset = e2.end_offset;
                sub.remove(inx + 1);
                let e1 = &mut sub[inx];
                e1.length += 1;
                e1.end_offset = end_offset;
                e1.token_type = Some(TokenType::Alphanum);
            }
            inx += 1;
        }
    }

    /// 部分語から記号を取り除きます。
    ///
    /// # 戻り値
    ///
    /// 記号の前後を連結した形など、新たに加える部分語
    fn drop_symbols(&self, sub: &mut Vec<RuleEntry>) -> Vec<RuleEntry> {
        let for_index = !self.option.for_query();
        let mut extra = vec![];
        let mut inx = 0;
        while inx < sub.len() {
            if sub[inx].is_type(TokenType::Symbol) {
                let c = sub[inx].first_char();
                if matches!(c, '-' | '_' | '/') && for_index {
                    if let Some(e) = Self::tail_model(sub, inx) {
                        extra.push(e);
                    }
                    if inx > 0 && inx + 1 < sub.len() {
                        if let Some(e) = Self::join_around(&sub[inx - 1], &sub[inx + 1]) {
                            extra.push(e);
                        }
                    }
                }
                sub.remove(inx);
                continue;
            }
            if sub[inx].is_type(TokenType::UnitAlpha) {
                let e0 = &mut sub[inx];
                if e0.sub_entries.is_empty() {
                    e0.token_type = Some(TokenType::Alphanum);
                } else {
                    let number = e0.sub_entries.remove(0);
                    e0.start += number.length;
                    e0.start_offset += number.length;
                    e0.length -= number.length;
                    e0.token_type = Some(TokenType::Alpha);
                    extra.push(number);
                }
                e0.synonyms.clear();
            } else if sub[inx].is_type(TokenType::Alpha) && inx + 1 < sub.len() {
                let (e0, e1) = (&sub[inx], &sub[inx + 1]);
                if e1.is_type(TokenType::Alpha) && e1.start_offset == e0.end_offset + 1 {
                    let chars: Vec<char> = e0.term().iter().chain(e1.term()).copied().collect();
                    let mut joined = e0.clone();
                    joined.buf = Arc::from(chars.as_slice());
                    joined.start = 0;
                    joined.length = chars.len();
                    joined.end_offset = e1.end_offset;
                    sub[inx] = joined;
                    sub.remove(inx + 1);
                }
            }
            inx += 1;
        }
        extra
    }

    /// `a-b1`のように先頭の英字を除いた型番を作ります。
    fn tail_model(sub: &[RuleEntry], inx: usize) -> Option<RuleEntry> {
        if inx != 1 || inx + 2 >= sub.len() {
            return None;
        }
        let (e1, e2, e3) = (&sub[0], &sub[2], &sub[3]);
        let e4 = sub.last()?;
        if e4.start == e2.start && e4.is_type(TokenType::Alphanum) {
            return None;
        }
        let mixed = (e2.is_type(TokenType::Alpha) && e3.is_type(TokenType::Number))
            || (e2.is_type(TokenType::Number) && e3.is_type(TokenType::Alpha));
        if e1.length > 0
            && e2.start > e1.end()
            && e2.is_followed_by(e3)
            && e1.is_type(TokenType::Alpha)
            && mixed
            && e4.same_buf(e2)
            && e4.end() > e2.start
        {
            Some(RuleEntry::new(
                e2.buf.clone(),
                e2.start,
                e4.end() - e2.start,
                e2.start_offset,
                e4.end_offset,
                Some(TokenType::ModelName),
            ))
        } else {
            None
        }
    }

    /// 記号の前後の同種の文字を連結した形を作ります。`7-4700`から`74700`を得ます。
    fn join_around(e1: &RuleEntry, e2: &RuleEntry) -> Option<RuleEntry> {
        if e2.start_offset != e1.end_offset + 1 {
            return None;
        }
        let wide = [TokenType::ModelName, TokenType::Alphanum];
        let narrow = [TokenType::Alpha, TokenType::Number, TokenType::Alphanum, TokenType::ModelName];
        let (left, right) = if (e1.is_any_type(&wide) && e2.is_any_type(&narrow))
            || (e2.is_any_type(&wide) && e1.is_any_type(&narrow))
        {
            let t1 = char_type(e1.last_char());
            let t2 = char_type(e2.first_char());
            if t1 != t2 {
                return None;
            }
            let n1 = e1.term().iter().rev().take_while(|&&c| char_type(c) == t1).count();
            let n2 = e2.term().iter().take_while(|&&c| char_type(c) == t2).count();
            let mut left = e1.clone();
            left.start += e1.length - n1;
            left.start_offset += e1.length - n1;
            left.length = n1;
            left.end_offset = left.start_offset + n1;
            left.token_type = Some(t1);
            let mut right = e2.clone();
            right.length = n2;
            right.end_offset = right.start_offset + n2;
            right.token_type = Some(t2);
            (left, right)
        } else if e1.is_any_type(&ALNUM) && e1.token_type == e2.token_type && !e2.is_any_type(&wide) {
            (e1.clone(), e2.clone())
        } else {
            return None;
        };
        let chars: Vec<char> = left.term().iter().chain(right.term()).copied().collect();
        let mut joined = left.clone();
        joined.buf = Arc::from(chars.as_slice());
        joined.start = 0;
        joined.length = chars.len();
        joined.start_offset = left.start_offset;
        joined.end_offset = right.end_offset;
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(s: &str, start_offset: usize, ty: TokenType) -> RuleEntry {
        let len = s.chars().count();
        RuleEntry::from_str(s, start_offset, start_offset + len, Some(ty))
    }

    #[test]
    fn test_join_around_numbers() {
        let buf: Arc<[char]> = "i7-4700".chars().collect();
        let mut left = RuleEntry::new(buf.clone(), 0, 2, 0, 2, Some(TokenType::Alphanum));
        left.sub_entries.push(entry("i", 0, TokenType::Alpha));
        let right = RuleEntry::new(buf, 3, 4, 3, 7, Some(TokenType::Number));
        let joined = ParsingRule::join_around(&left, &right).unwrap();
        assert_eq!(joined.surface(), "74700");
        assert_eq!(joined.range(), 1..7);
        assert_eq!(joined.token_type, Some(TokenType::Number));
    }

    #[test]
    fn test_join_around_needs_one_char_gap() {
        let left = entry("ab", 0, TokenType::Alpha);
        let right = entry("cd", 4, TokenType::Alpha);
        assert!(ParsingRule::join_around(&left, &right).is_none());
    }

    #[test]
    fn test_glue_interleaved() {
        let buf: Arc<[char]> = "a1-xyz".chars().collect();
        let mut sub = vec![
            RuleEntry::new(buf.clone(), 0, 1, 0, 1, Some(TokenType::Alpha)),
            RuleEntry::new(buf.clone(), 1, 1, 1, 2, Some(TokenType::Number)),
            RuleEntry::new(buf.clone(), 2, 1, 2, 3, Some(TokenType::Symbol)),
            RuleEntry::new(buf, 3, 3, 3, 6, Some(TokenType::Alpha)),
        ];
        ParsingRule::glue_interleaved(&mut sub);
        let got: Vec<_> = sub.iter().map(|e| (e.surface(), e.range())).collect();
        assert_eq!(
            got,
            vec![
                ("a1".to_string(), 0..2),
                ("-".to_string(), 2..3),
                ("xyz".to_string(), 3..6),
            ]
        );
        assert_eq!(sub[0].token_type, Some(TokenType::Alphanum));
        assert_eq!(sub[0].sub_entries.len(), 2);
    }
}
