mod bytemuck {}
mod core {}
mod ordbits {}

#[allow(dead_code)]
struct Option;
#[allow(dead_code)]
struct Result;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Reg {
    Mode,
    Level,
    Unused,
}

impl ::ordbits::Tag for Reg {
    const PADDING: Self = Reg::Unused;
}

::ordbits::bitfield! {
    pub struct Named: u16 {
        pub mode: 3 = 1,
        _: 0,
        pub const version: 4 = 2,
    }

    #[tags(Reg)]
    struct Tagged: i8 {
        mode: 2,
        _: 1,
        level: 5 = -1,
    }
}

fn main() {}
