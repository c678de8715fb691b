use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;

pub const HEADER: [&str; 5] = [
    "btcturk_bid",
    "btcturk_ask",
    "binance_bid",
    "binance_ask",
    "time",
];

/// 한 번의 폴링 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ArbRecord {
    pub btcturk_bid: Decimal,
    pub btcturk_ask: Decimal,
    pub binance_bid: Decimal,
    pub binance_ask: Decimal,
    /// `D-M-YYYY H:M:S` (BtcTurk 티커 시각)
    pub time: String,
}

impl ArbRecord {
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.btcturk_bid, self.btcturk_ask, self.binance_bid, self.binance_ask, self.time
        )
    }
}

/// 탭 구분 append-only 기록 파일. 새 파일이면 헤더를 먼저 쓴다.
pub struct RecordLog {
    path: PathBuf,
    file: File,
    written: u64,
}

impl RecordLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", HEADER.join("\t"))?;
            file.flush()?;
        }

        Ok(Self {
            path,
            file,
            written: 0,
        })
    }

    /// 한 행 추가. 이번 실행에서 기록한 행 수를 돌려준다.
    pub fn append(&mut self, record: &ArbRecord) -> io::Result<u64> {
        writeln!(self.file, "{}", record.to_line())?;
        self.file.flush()?;
        self.written += 1;
        Ok(self.written)
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
