#[macro_export]
macro_rules! impl_bitfield_codecs {
    ($ty:ty) => {
        impl<Ctx: Copy> Decode<Ctx> for $ty {
            #[inline]
            fn decode<R>(ctx: Ctx, reader: &mut R) -> Result<Self, ::declio::Error>
            where
                R: ::std::io::Read,
            {
                let bytes = ::declio::util::byte_array::decode(ctx, reader)?;
                Ok(<$ty>::from_bytes(bytes))
            }
        }

        impl<Ctx> Encode<Ctx> for $ty {
            #[inline]
            fn encode<W>(&self, _ctx: Ctx, writer: &mut W) -> Result<(), ::declio::Error>
            where
                W: ::std::io::Write,
            {
                writer.write_all(&self.into_bytes())?;
                Ok(())
            }
        }

        impl<Ctx> EncodedSize<Ctx> for $ty {
            #[inline]
            fn encoded_size(&self, _ctx: Ctx) -> usize {
                ::std::mem::size_of_val(self)
            }
        }
    };
}
