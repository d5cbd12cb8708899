//! 辞書のバイナリ入出力
//!
//! 辞書ファイルは以下のプリミティブで構成されます。
//!
//! - `int`: 4バイトのビッグエンディアン符号付き整数
//! - `vint`: 下位ビットから7ビットずつ書き出す可変長整数
//! - `string`: `vint`のUTF-8バイト長とバイト列
//! - `double`: IEEE-754のビット列を8バイトのビッグエンディアンで書き出したもの

use std::io::{self, Read, Write};

use crate::char_window::CharWindow;
use crate::errors::{Result, SangpumError};

/// 可変長整数の最大バイト数。
const MAX_VINT_BYTES: usize = 5;

/// 辞書ストリームへの書き込み器。
pub struct DataOutput<W: Write> {
    wtr: W,
}

impl<W: Write> DataOutput<W> {
    /// 新しい書き込み器を生成します。
    pub fn new(wtr: W) -> Self {
        Self { wtr }
    }

    /// 1バイトを書き込みます。
    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.wtr.write_all(&[value])?;
        Ok(())
    }

    /// 4バイトの整数を書き込みます。
    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.wtr.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    /// 件数を`int`として書き込みます。
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let value = i32::try_from(count)
            .map_err(|_| SangpumError::invalid_argument("count", "too many entries"))?;
        self.write_int(value)
    }

    /// 可変長整数を書き込みます。
    pub fn write_vint(&mut self, mut value: u32) -> Result<()> {
        while value & !0x7F != 0 {
            self.write_byte(((value & 0x7F) | 0x80) as u8)?;
            value >>= 7;
        }
        self.write_byte(value as u8)
    }

    /// 件数を`vint`として書き込みます。
    pub fn write_vcount(&mut self, count: usize) -> Result<()> {
        let value = u32::try_from(count)
            .map_err(|_| SangpumError::invalid_argument("count", "too many entries"))?;
        self.write_vint(value)
    }

    /// 8バイトの浮動小数点数を書き込みます。
    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.wtr.write_all(&value.to_bits().to_be_bytes())?;
        Ok(())
    }

    /// 長さ付きの文字列を書き込みます。
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_vcount(value.len())?;
        self.wtr.write_all(value.as_bytes())?;
        Ok(())
    }

    /// 窓の内容を長さ付きの文字列として書き込みます。
    pub fn write_window(&mut self, value: &CharWindow) -> Result<()> {
        let s: String = value.as_chars().iter().collect();
        self.write_string(&s)
    }

    /// バッファをフラッシュします。
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// 内部の書き込み先を返します。
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

/// 辞書ストリームからの読み込み器。
///
/// 読み込んだバイト数を記録し、デコードエラーに位置を含めます。
pub struct DataInput<R: Read> {
    rdr: R,
    position: usize,
}

impl<R: Read> DataInput<R> {
    /// 新しい読み込み器を生成します。
    pub fn new(rdr: R) -> Self {
        Self { rdr, position: 0 }
    }

    /// これまでに読み込んだバイト数。
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    fn fill(&mut self, buf: &mut [u8], what: &'static str) -> Result<()> {
        match self.rdr.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(SangpumError::decode(what, self.position))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 1バイトを読み込みます。
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.fill(&mut buf, "byte")?;
        Ok(buf[0])
    }

    /// 4バイトの整数を読み込みます。
    pub fn read_int(&mut self) -> Result<i32> {
        let mut buf = [0; 4];
        self.fill(&mut buf, "int")?;
        Ok(i32::from_be_bytes(buf))
    }

    /// `int`として書かれた件数を読み込みます。負の値はデコードエラーです。
    pub fn read_count(&mut self) -> Result<usize> {
        let position = self.position;
        let value = self.read_int()?;
        usize::try_from(value).map_err(|_| SangpumError::decode("count", position))
    }

    /// 可変長整数を読み込みます。
    pub fn read_vint(&mut self) -> Result<u32> {
        let position = self.position;
        let mut value = 0u32;
        for i in 0..MAX_VINT_BYTES {
            let b = self.read_byte()?;
            value |= u32::from(b & 0x7F) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(SangpumError::decode("vint", position))
    }

    /// `vint`として書かれた件数を読み込みます。
    pub fn read_vcount(&mut self) -> Result<usize> {
        Ok(usize::try_from(self.read_vint()?).unwrap_or(usize::MAX))
    }

    /// 8バイトの浮動小数点数を読み込みます。
    pub fn read_double(&mut self) -> Result<f64> {
        let mut buf = [0; 8];
        self.fill(&mut buf, "double")?;
        Ok(f64::from_bits(u64::from_be_bytes(buf)))
    }

    /// 長さ付きの文字列を読み込みます。
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_vcount()?;
        let position = self.position;
        let mut bytes = Vec::new();
        let read = (&mut self.rdr).take(len as u64).read_to_end(&mut bytes)?;
        self.position += read;
        if read != len {
            return Err(SangpumError::decode("string", position));
        }
        String::from_utf8(bytes).map_err(|_| SangpumError::decode("utf-8 string", position))
    }

    /// 長さ付きの文字列を窓として読み込みます。
    pub fn read_window(&mut self, ignore_case: bool) -> Result<CharWindow> {
        Ok(CharWindow::from_str(&self.read_string()?, ignore_case))
    }

    /// 内部の読み込み元を返します。
    pub fn into_inner(self) -> R {
        self.rdr
    }
}
