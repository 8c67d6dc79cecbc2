//! 探索の評価値（Value）
//!
//! センチポーン相当の整数で、最大化側から見た値。
//! `Value::MATE` は勝ち確定、`-Value::MATE` は負け確定に予約されている。

/// 探索の評価値
///
/// 通常の評価値は駒割りと位置評価の差分で、`MATE` よりずっと小さい。
/// `INFINITE` はαβの窓の端にだけ現れる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Value(i32);

impl Value {
    /// ゼロ
    pub const ZERO: Value = Value(0);
    /// 引き分け
    pub const DRAW: Value = Value(0);
    /// 最大化側の勝ち確定
    pub const MATE: Value = Value(1_000_000);
    /// 開いた窓の端
    ///
    /// 窓の端に `MATE` 程度の差分を足しても `i32` があふれない大きさ。
    pub const INFINITE: Value = Value(1_000_000_000);

    /// 生の整数から作る
    #[inline]
    pub const fn new(v: i32) -> Value {
        Value(v)
    }

    /// 最大化側の勝ち確定
    #[inline]
    pub const fn is_win(self) -> bool {
        self.0 >= Self::MATE.0
    }

    /// 最大化側の負け確定
    #[inline]
    pub const fn is_loss(self) -> bool {
        self.0 <= -Self::MATE.0
    }

    /// 勝ちか負けが確定
    #[inline]
    pub const fn is_mate_score(self) -> bool {
        self.is_win() || self.is_loss()
    }

    /// 生の整数値
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// 絶対値
    #[inline]
    pub const fn abs(self) -> Value {
        Value(self.0.abs())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::ZERO
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_win() {
            write!(f, "+mate")
        } else if self.is_loss() {
            write!(f, "-mate")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl std::ops::Add for Value {
    type Output = Value;

    #[inline]
    fn add(self, rhs: Value) -> Value {
        Value(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Value {
    type Output = Value;

    #[inline]
    fn sub(self, rhs: Value) -> Value {
        Value(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Value {
    #[inline]
    fn add_assign(&mut self, rhs: Value) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Value {
    #[inline]
    fn sub_assign(&mut self, rhs: Value) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul<i32> for Value {
    type Output = Value;

    #[inline]
    fn mul(self, rhs: i32) -> Value {
        Value(self.0 * rhs)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value(v)
    }
}

impl From<Value> for i32 {
    fn from(v: Value) -> i32 {
        v.0
    }
}
