//! 共通の定数定義
//!
//! 解析器全体で共有される上限値、記号集合、辞書名を定義します。

/// 格子テーブルの幅(一度に解析する最大文字数)。
pub const TABULAR_SIZE: usize = 20;

/// 優先度付きキューに保持できる候補の上限。
pub const QUEUE_MAX: usize = 200;

/// 保持する解析結果の上限。超えた場合は最良の1件に縮約されます。
pub const RESULT_MAX: usize = 10;

/// 早期終了を有効にする入力長の下限(この長さを超える入力が対象)。
pub const FAST_RESULT_MIN_LENGTH: usize = 6;

/// 単位として認識する最大文字数。
pub const MAX_UNIT_LENGTH: usize = 10;

/// 全体文字列トークンを生成する入力長の上限(未満)。
pub const FULL_TERM_LENGTH: usize = 64;

/// 併合候補として前方に探索する最大エントリ数。
pub const MAX_MERGE_PROBE: usize = 10;

/// 単位候補として前方に探索する最大エントリ数。
pub const MAX_UNIT_PROBE: usize = 5;

/// 一般に語の中に含めることができる記号。
pub const AVAIL_SYMBOLS: &[char] = &['-', '.', '/', '+', '&'];

/// 単独で出力できる記号。現在は空です。
pub const AVAIL_SYMBOLS_STANDALONE: &[char] = &[];

/// 連結子として使用できる記号。
pub const AVAIL_SYMBOLS_CONNECTOR: &[char] = &['-', '.', '/', '&'];

/// 数字の中で使用できる記号。
pub const AVAIL_SYMBOLS_INNUMBER: &[char] = &[',', '.', ':'];

/// 語の区切りとして扱う記号。
pub const AVAIL_SYMBOLS_SPLIT: &[char] = &[',', '|', '[', ']', '<', '>', '{', '}', '^'];

/// 単位同義語辞書の名前。
pub const DICT_UNIT_SYNONYM: &str = "unit_synonym";
/// 単位辞書の名前。
pub const DICT_UNIT: &str = "unit";
/// 分かち書き辞書の名前。
pub const DICT_SPACE: &str = "space";
/// 同義語辞書の名前。
pub const DICT_SYNONYM: &str = "synonym";
/// 不用語辞書の名前。
pub const DICT_STOP: &str = "stop";
/// ユーザー辞書の名前。
pub const DICT_USER: &str = "user";
/// 複合名詞辞書の名前。
pub const DICT_COMPOUND: &str = "compound";
/// メーカー辞書の名前。
pub const DICT_MAKER: &str = "maker";
/// ブランド辞書の名前。
pub const DICT_BRAND: &str = "brand";
/// カテゴリ辞書の名前。
pub const DICT_CATEGORY: &str = "category";

/// 記号集合に文字が含まれるかを判定します。
#[inline(always)]
pub fn contains_char(set: &[char], ch: char) -> bool {
    set.contains(&ch)
}
