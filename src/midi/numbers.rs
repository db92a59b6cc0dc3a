/// A MIDI channel number, 0 to 15 (displayed by most software as 1 to 16).
clamp!(Channel, u8, 0, 15, 0, pub);

/// A MIDI note number, 0 to 127. 60 is middle C.
clamp!(NoteNumber, u8, 0, 127, 60, pub);

/// A note velocity, 0 to 127.
clamp!(Velocity, u8, 0, 127, 72, pub);

/// A program (patch) number, 0 to 127.
clamp!(Program, u8, 0, 127, 0, pub);

/// A generic 7-bit MIDI data value, 0 to 127.
clamp!(U7, u8, 0, 127, 0, pub);

/// A control change value, 0 to 127.
clamp!(ControlValue, u8, 0, 127, 0, pub);

/// A MIDI port value, 0 to 15.
clamp!(PortValue, u8, 0, 15, 0, pub);
