//! ユーティリティ関数を提供するモジュール
//!
//! このモジュールには、辞書ソース行の分割とテスト用のマクロが含まれています。

use csv_core::ReadFieldResult;

/// 区切り文字で1行をフィールドに分割する
///
/// 引用符は解釈しません。区切り文字はそのままフィールドの境界になります。
///
/// # 引数
///
/// * `row` - 分割する1行
/// * `delimiter` - 区切り文字(`b'\t'`や`b','`)
///
/// # 戻り値
///
/// 分割されたフィールドのベクター。空行の場合は空のベクター。
///
/// # 例
///
/// ```
/// # use sangpum::utils::split_fields;
/// assert_eq!(split_fields("노트북\t노트 북", b'\t'), vec!["노트북", "노트 북"]);
/// assert_eq!(split_fields("a,\"b,c\"", b','), vec!["a", "\"b", "c\""]);
/// ```
pub fn split_fields(row: &str, delimiter: u8) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = csv_core::ReaderBuilder::new()
        .delimiter(delimiter)
        .quoting(false)
        .build();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    let mut field = Vec::new();
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        bytes = &bytes[nin..];
        field.extend_from_slice(&output[..nout]);
        match result {
            // An empty slice on the next call signals EOF to the reader.
            ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
            ReadFieldResult::Field { record_end } => {
                fields.push(String::from_utf8_lossy(&field).into_owned());
                field.clear();
                if record_end {
                    break;
                }
            }
            ReadFieldResult::End => break,
        }
    }
    fields
}

/// 辞書ソース行をタブで分割する
///
/// 末尾の空フィールドは取り除かれます。
pub fn split_source_line(line: &str) -> Vec<String> {
    let mut fields = split_fields(line.trim_end_matches(['\r', '\n']), b'\t');
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

#[cfg(test)]
/// HashMapリテラルを簡潔に記述するためのマクロ
///
/// # 例
///
/// ```ignore
/// let map = hashmap! {
///     "key1" => "value1",
///     "key2" => "value2",
/// };
/// ```
macro_rules! hashmap {
    ( $($k:expr => $v:expr,)* ) => {
        {
            #[allow(unused_mut)]
            let mut h = hashbrown::HashMap::new();
            $(
                h.insert($k, $v);
            )*
            h
        }
    };
    ( $($k:expr => $v:expr),* ) => {
        hashmap![$( $k => $v, )*]
    };
}

#[cfg(test)]
pub(crate) use hashmap;
