use crate::media::TrackKind;
use meshcall_core::ServerMessage;

/// Команды, поступающие в контроллер звонка снаружи (сигнальный канал,
/// платформа, UI).
#[derive(Debug)]
pub enum CallCommand {
    /// Входящее сообщение от реле.
    Signal(ServerMessage),

    /// Платформа сообщила об изменении набора устройств захвата.
    DeviceChange,

    /// Пользователь выключил/включил микрофон или камеру.
    ToggleMute(TrackKind),
}
