#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSound {
    FoundSecret,
    PickLock,
    PickFail,
    Disarmed,
}

pub trait Audio {
    /// Plays a sound resource on the actions channel.
    fn play_relative(&mut self, resref: &str);

    /// Plays one of the stock interface sounds on the hits channel.
    fn play_default(&mut self, sound: DefaultSound);
}
